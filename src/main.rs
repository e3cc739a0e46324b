fn main() -> Result<(), anyhow::Error> {
    edgefold::run()
}

use std::fmt::Write;

use anyhow::{Context, Result};

use compile::Compiled;
use workflow::{Workflow, WorkflowDef};

use crate::render::PythonRenderer;
use crate::settings::Settings;
use crate::ui::Ui;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Nothing to output: no edge in the workflow could be placed in a graph")]
    NothingToOutput,
}

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let ui = Ui::new(&settings);
        Self { settings, ui }
    }

    /// Run the app: load the workflow, compile it, and write the rendered graphs.
    pub fn run(mut self) -> Result<()> {
        let wf = self.load_workflow()?;
        let compiled = self
            .ui
            .phase("Compiling graph", || Ok(compile::compile(&wf)))?;

        let text = self.render(&wf, &compiled)?;
        self.write_output(&text)
    }

    fn load_workflow(&mut self) -> Result<Workflow> {
        let config = &self.settings.config;
        self.ui
            .verbose_msg(&format!("Reading workflow from {:?}", config));
        let text = std::fs::read_to_string(config)
            .with_context(|| format!("while reading config file {:?}", config))?;
        let def: WorkflowDef = serde_json::from_str(&text)
            .with_context(|| format!("while parsing config file {:?}", config))?;

        self.ui.phase("Loading workflow", || Workflow::load(def))
    }

    fn render(&self, wf: &Workflow, compiled: &Compiled) -> Result<String> {
        let realized = compiled.realize_with(&mut PythonRenderer::new(wf))?;
        let show_components = self.settings.components && !realized.components.is_empty();
        if realized.main.is_none() && !show_components {
            return Err(Error::NothingToOutput.into());
        }

        let mut out = String::with_capacity(256);
        match &realized.main {
            Some(main) => writeln!(out, "graph = {}", main)?,
            None => writeln!(out, "graph = None")?,
        }
        if show_components {
            writeln!(out, "\nunused_graphs = {{")?;
            for component in &realized.components {
                writeln!(out, "    {},", component)?;
            }
            writeln!(out, "}}")?;
        } else if !realized.components.is_empty() {
            log::info!("omitting {} unused graphs", realized.components.len());
        }
        Ok(out)
    }

    fn write_output(&self, text: &str) -> Result<()> {
        match &self.settings.output {
            Some(path) => {
                log::info!("writing graph to {:?}", path);
                std::fs::write(path, text)
                    .with_context(|| format!("while writing output file {:?}", path))
            }
            None => {
                print!("{}", text);
                Ok(())
            }
        }
    }
}

//! Command handlers: run one engine operation and render its markdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use jiff::Timestamp;
use keel_core::{
    params::{CreatePlan, Id},
    Engine, KeelError, LocalDateTime, OperationResult, Sweep, Worker,
};
use log::info;

use crate::{
    args::{Commands, WorkArgs},
    renderer::TerminalRenderer,
};

/// Dispatches parsed commands against one engine.
pub struct Cli {
    engine: Arc<Engine>,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(engine: Arc<Engine>, renderer: TerminalRenderer) -> Self {
        Self { engine, renderer }
    }

    pub async fn handle_command(self, command: Commands) -> Result<()> {
        match command {
            Commands::Create(args) => self.create_plan(&args.into()),
            Commands::Ack(args) => self.acknowledge(&args.into()),
            Commands::Show(args) => self.show_plan(&args.into()),
            Commands::Scope => self.scope(),
            Commands::Tick(args) => self.tick(&args.into()).await,
            Commands::Work(args) => self.work(&args).await,
            Commands::Sweep => self.sweep().await,
        }
    }

    fn create_plan(&self, params: &CreatePlan) -> Result<()> {
        let plan = self
            .engine
            .create_plan(params)
            .with_context(|| format!("Failed to create plan {}", params.id.trim()))?;
        self.renderer
            .render(&OperationResult::created(&plan).to_string())
    }

    fn acknowledge(&self, params: &Id) -> Result<()> {
        let plan = self
            .engine
            .acknowledge(params)
            .with_context(|| format!("Failed to acknowledge plan {}", params.id))?;
        self.renderer
            .render(&OperationResult::acknowledged(&plan).to_string())
    }

    fn show_plan(&self, params: &Id) -> Result<()> {
        let plan = self.engine.show_plan(params)?;
        let due = match self.engine.due_at(params)? {
            Some(at) => LocalDateTime(&at).to_string(),
            None => "not scheduled".to_string(),
        };
        self.renderer.render(&format!("{plan}\n- Next due: {due}\n"))
    }

    fn scope(&self) -> Result<()> {
        let scope = self.engine.scope().context("Failed to build scope report")?;
        self.renderer.render(&scope.to_string())
    }

    async fn tick(&self, params: &Id) -> Result<()> {
        let plan = self
            .engine
            .tick(&params.id)
            .await
            .with_context(|| format!("Failed to tick plan {}", params.id))?
            .ok_or_else(|| KeelError::PlanNotFound {
                id: params.id.clone(),
            })?;
        self.renderer
            .render(&OperationResult::ticked(&plan).to_string())
    }

    async fn work(&self, args: &WorkArgs) -> Result<()> {
        let worker = Worker::new(self.engine.clone());
        if args.once {
            if args.boot_tick_all {
                worker.boot()?;
            }
            let report = worker.poll_once(Timestamp::now()).await?;
            return self.renderer.render(&report.to_string());
        }

        info!("worker started; press Ctrl-C to stop");
        worker
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {e}");
                }
            })
            .await
            .context("Worker stopped")
    }

    async fn sweep(&self) -> Result<()> {
        let report = Sweep::new(self.engine.clone())
            .run()
            .await
            .context("Sweep failed")?;
        self.renderer.render(&report.to_string())
    }
}

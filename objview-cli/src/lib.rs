/// Command-line host for the objview core
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use objview_core::obj::write_obj;
use objview_core::{Command, FacePolicy, LoadOptions, LoadReport, Model};

/// Load a geometry file, apply commands to it and print the result
#[derive(Parser, Debug)]
#[command(name = "objview")]
#[command(about = "Load, normalize and transform v/f geometry files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Geometry file to load
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Command to apply after loading, e.g. "rotate 30 y" (repeatable)
    #[arg(short = 'e', long = "exec", value_name = "CMD")]
    pub exec: Vec<String>,

    /// File with one command per line; blank lines and `#` comments are skipped
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Drop malformed faces instead of rejecting the file
    #[arg(long)]
    pub skip_malformed_faces: bool,

    /// Print the transformed vertices and faces as v/f records
    #[arg(long)]
    pub dump: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        let policy = if self.skip_malformed_faces {
            FacePolicy::Skip
        } else {
            FacePolicy::Reject
        };
        LoadOptions::default().with_face_policy(policy)
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Every command to run, `--exec` first, then the script
    pub fn commands(&self) -> Result<Vec<Command>> {
        let mut commands = Vec::with_capacity(self.exec.len());
        for text in &self.exec {
            commands.push(text.parse::<Command>()?);
        }

        if let Some(script) = &self.script {
            let source = fs::read_to_string(script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            commands.extend(parse_script(&source).with_context(|| {
                format!("failed to parse script {}", script.display())
            })?);
        }

        Ok(commands)
    }
}

/// Parse one command per non-blank, non-comment line
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            line.parse::<Command>()
                .with_context(|| format!("line {}", number))
        })
        .collect()
}

/// A loaded model plus the options and report that produced it
pub struct Session {
    model: Model,
    options: LoadOptions,
    report: LoadReport,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self> {
        let options = cli.load_options();
        let mut model = Model::new();
        let report = model
            .load_with(&cli.file, &options)
            .with_context(|| format!("failed to load {}", cli.file.display()))?;

        Ok(Self {
            model,
            options,
            report,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn apply(&mut self, command: &Command) -> Result<()> {
        if let Some(report) = self
            .model
            .apply_with(command, &self.options)
            .with_context(|| format!("`{}` failed", command))?
        {
            self.report = report;
        }
        info!("Applied `{}`", command);
        Ok(())
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let model = &self.model;
        let center = model.center();
        let rotation = model.current_rotation();
        let report = &self.report;

        writeln!(out, "vertices:       {}", model.vertex_count())?;
        writeln!(out, "faces:          {}", model.face_count())?;
        writeln!(out, "center:         {} {} {}", center.x, center.y, center.z)?;
        writeln!(out, "rotation:       {} {} {}", rotation.x, rotation.y, rotation.z)?;
        writeln!(out, "generation:     {}", model.generation())?;
        writeln!(out, "skipped tokens: {}", report.skipped_tokens)?;
        writeln!(out, "skipped faces:  {}", report.skipped_faces)?;
        writeln!(out, "ignored lines:  {}", report.ignored_lines)?;
        writeln!(out, "degenerate:     {}", report.degenerate)?;
        Ok(())
    }

    pub fn write_dump<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write_obj(self.model.mesh(), out)
    }
}

/// Load, apply every command and print the summary (and dump) to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<Session> {
    let commands = cli.commands()?;
    let mut session = Session::open(cli)?;

    for command in &commands {
        session.apply(command)?;
    }

    session.write_summary(out)?;
    if cli.dump {
        session.write_dump(&mut *out)?;
    }
    Ok(session)
}

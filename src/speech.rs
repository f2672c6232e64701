use std::process::{Command, Stdio};

/// Reads text aloud. Failures are logged, never surfaced.
pub trait Speaker {
    fn speak(&self, text: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, text: &str) {
        tracing::debug!(chars = text.chars().count(), "speech disabled");
    }
}

/// Spawns an external TTS program with the text as its last argument and
/// does not wait for it.
#[derive(Clone, Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Split a configured command line on whitespace. `None` when blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(e) = spawned {
            tracing::warn!(program = %self.program, error = %e, "speech command failed");
        }
    }
}

pub fn build_speaker(command: Option<&str>) -> Box<dyn Speaker> {
    match command.and_then(CommandSpeaker::from_command_line) {
        Some(speaker) => Box::new(speaker),
        None => Box::new(SilentSpeaker),
    }
}

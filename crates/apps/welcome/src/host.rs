//! Console stand-in for the welcome screen

use std::io::Write;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::{error, info};
use mail::{Destination, LaunchHost};

/// Prints the destination the router opens as JSON
pub struct ConsoleHost<W> {
    out: Mutex<W>,
    opened: Mutex<Option<Destination>>,
}

impl<W: Write + Send> ConsoleHost<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            opened: Mutex::new(None),
        }
    }

    /// The last destination opened, if any
    pub fn opened(&self) -> Option<Destination> {
        *self.opened.lock().unwrap()
    }
}

impl<W: Write + Send> LaunchHost for ConsoleHost<W> {
    fn open(&self, destination: &Destination) -> Result<()> {
        let json = serde_json::to_string(destination).context("Failed to encode destination")?;
        {
            let mut out = self.out.lock().unwrap();
            writeln!(out, "{}", json).context("Failed to write destination")?;
            out.flush()?;
        }
        *self.opened.lock().unwrap() = Some(*destination);
        Ok(())
    }

    fn finish(&self) {
        info!("Welcome screen finished");
    }

    fn report_failure(&self, error: &anyhow::Error) {
        error!("Could not route launch: {:#}", error);
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "error: {:#}", error);
        }
    }
}

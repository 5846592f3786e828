// Best-effort print submission through the system spooler
use std::path::Path;
use std::process::Command;

use crate::error::{LabelError, Result};

const NO_DEFAULT_SENTINEL: &str = "no system default destination";

/// Print destination for a composed sheet. Injectable so composition stays
/// testable without an OS spooler; failures never outrank a finished sheet.
pub trait PrintSink {
    fn print(&self, sheet: &Path) -> Result<()>;
}

/// CUPS front end: `lpstat -d` to find the default destination, `lp` to
/// submit. Anything short of a submitted job is a `Print` error the caller
/// downgrades to a manual-print instruction.
pub struct CupsPrinter;

impl PrintSink for CupsPrinter {
    fn print(&self, sheet: &Path) -> Result<()> {
        let query = Command::new("lpstat")
            .arg("-d")
            .output()
            .map_err(|e| LabelError::Print {
                reason: format!("lpstat unavailable: {e}"),
            })?;
        if !query.status.success() {
            return Err(LabelError::Print {
                reason: format!("lpstat -d exited with {}", query.status),
            });
        }
        let destination = String::from_utf8_lossy(&query.stdout).trim().to_string();
        if destination.is_empty() || destination == NO_DEFAULT_SENTINEL {
            return Err(LabelError::Print {
                reason: "no default printer configured".to_string(),
            });
        }

        let submit = Command::new("lp")
            .arg(sheet)
            .status()
            .map_err(|e| LabelError::Print {
                reason: format!("lp unavailable: {e}"),
            })?;
        if submit.success() {
            Ok(())
        } else {
            Err(LabelError::Print {
                reason: format!("lp exited with {submit} for {}", sheet.display()),
            })
        }
    }
}

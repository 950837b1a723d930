// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly session — processing status and the current output handle.

use befund_core::error::Result;
use befund_core::human_errors::{HumanError, humanize_error};
use befund_core::types::{AssemblyInputs, ProcessingStatus};
use tracing::{info, warn};

use crate::assemble::Assembler;
use crate::store::DocumentHandle;

/// Tracks one user's run-at-a-time interaction with the assembler.
///
/// Holds at most one live document handle. Starting a new run or resetting
/// releases the previous one.
pub struct AssemblySession {
    assembler: Assembler,
    status: ProcessingStatus,
    handle: Option<DocumentHandle>,
    error: Option<HumanError>,
}

impl AssemblySession {
    pub fn new(assembler: Assembler) -> Self {
        Self {
            assembler,
            status: ProcessingStatus::Idle,
            handle: None,
            error: None,
        }
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    /// Handle of the last successful run, until reset or the next run.
    pub fn handle(&self) -> Option<&DocumentHandle> {
        self.handle.as_ref()
    }

    /// User-facing description of the last failure.
    pub fn error(&self) -> Option<&HumanError> {
        self.error.as_ref()
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// Run assembly over `inputs`, replacing any previous result.
    pub async fn process(&mut self, inputs: AssemblyInputs) -> Result<DocumentHandle> {
        self.release_handle();
        self.error = None;
        self.status = ProcessingStatus::Processing;

        match self.assembler.assemble(inputs).await {
            Ok(handle) => {
                info!(id = %handle.id, "Processing finished");
                self.status = ProcessingStatus::Success;
                self.handle = Some(handle.clone());
                Ok(handle)
            }
            Err(err) => {
                warn!(error = %err, "Processing failed");
                self.status = ProcessingStatus::Error;
                self.error = Some(humanize_error(&err));
                Err(err)
            }
        }
    }

    /// Forget the last result and return to idle.
    pub fn reset(&mut self) {
        self.release_handle();
        self.error = None;
        self.status = ProcessingStatus::Idle;
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.assembler.store().release(&handle);
        }
    }
}

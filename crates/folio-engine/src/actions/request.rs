use serde_json::{Map, Value};

use super::{ActionOutcome, RequestKind, SuspensionRequest};
use crate::catalog::ActionKind;
use crate::error::Result;
use crate::params::{self, RequestFilesParams, RequestInputParams};

pub(super) fn request_files(parameters: &Map<String, Value>) -> Result<ActionOutcome> {
    let p: RequestFilesParams = params::extract(ActionKind::RequestFiles, parameters)?;
    Ok(ActionOutcome::Suspend(SuspensionRequest {
        kind: RequestKind::RequestFiles,
        reason: p.reason,
    }))
}

pub(super) fn request_input(parameters: &Map<String, Value>) -> Result<ActionOutcome> {
    let p: RequestInputParams = params::extract(ActionKind::RequestInput, parameters)?;
    Ok(ActionOutcome::Suspend(SuspensionRequest {
        kind: RequestKind::RequestInput(p.kind),
        reason: p.reason,
    }))
}

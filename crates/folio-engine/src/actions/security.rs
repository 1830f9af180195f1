use serde_json::{Map, Value};

use super::{ActionContext, ActionOutcome, Effect};
use crate::catalog::ActionKind;
use crate::document::SaveOptions;
use crate::error::Result;
use crate::params::{self, PasswordParams};

pub(super) fn protect(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: PasswordParams = params::extract(ActionKind::Protect, parameters)?;
    let (_, pdf) = cx.open_primary(ActionKind::Protect)?;
    let bytes = pdf.save(&SaveOptions {
        password: Some(p.password.clone()),
        compress: false,
    })?;
    Ok(ActionOutcome::Continue(Effect::Reprotect {
        bytes,
        password: Some(p.password),
    }))
}

/// Open with the given password and save without one
pub(super) fn unlock(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: PasswordParams = params::extract(ActionKind::Unlock, parameters)?;
    let primary = cx.primary(ActionKind::Unlock)?;
    let pdf = cx.library.load(&primary.bytes, Some(&p.password))?;
    let bytes = pdf.save(&SaveOptions::default())?;
    Ok(ActionOutcome::Continue(Effect::Reprotect {
        bytes,
        password: None,
    }))
}

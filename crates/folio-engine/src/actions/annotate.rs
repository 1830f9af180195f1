//! Drawing actions: page numbers, watermark, free text, whiteout

use serde_json::{Map, Value};

use super::{ActionContext, ActionOutcome, page_index, save_edited};
use crate::catalog::ActionKind;
use crate::document::{Color, TextStyle};
use crate::error::Result;
use crate::params::{self, AddTextParams, PageNumberParams, WatermarkParams, WhiteoutParams};
use crate::position::{self, Anchor};

const PAGE_NUMBER_SIZE: f32 = 12.0;

pub(super) fn add_page_numbers(
    parameters: &Map<String, Value>,
    cx: &ActionContext<'_>,
) -> Result<ActionOutcome> {
    let p: PageNumberParams = params::extract(ActionKind::AddPageNumbers, parameters)?;
    let (primary, mut pdf) = cx.open_primary(ActionKind::AddPageNumbers)?;
    let total = pdf.page_count();

    for page in 0..total {
        let label = p.format.label(page + 1, total);
        let size = pdf.page_size(page)?;
        let width = pdf.text_width(&label, PAGE_NUMBER_SIZE);
        let (x, y) = position::resolve(
            p.position,
            width,
            PAGE_NUMBER_SIZE,
            size.width,
            size.height,
            cx.config.margin,
        );
        pdf.draw_text(page, &label, x, y, &TextStyle::plain(PAGE_NUMBER_SIZE))?;
    }
    save_edited(pdf.as_ref(), primary)
}

/// Centered, rotated, translucent text on every page
pub(super) fn watermark(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: WatermarkParams = params::extract(ActionKind::Watermark, parameters)?;
    let (primary, mut pdf) = cx.open_primary(ActionKind::Watermark)?;
    let style = TextStyle {
        size: p.font_size,
        color: Color::GRAY,
        opacity: p.opacity.clamp(0.0, 1.0),
        rotation: p.rotation,
    };

    for page in 0..pdf.page_count() {
        let size = pdf.page_size(page)?;
        let width = pdf.text_width(&p.text, p.font_size);
        let (x, y) = position::resolve(
            Anchor::Center,
            width,
            p.font_size,
            size.width,
            size.height,
            cx.config.margin,
        );
        pdf.draw_text(page, &p.text, x, y, &style)?;
    }
    save_edited(pdf.as_ref(), primary)
}

pub(super) fn add_text(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: AddTextParams = params::extract(ActionKind::AddText, parameters)?;
    let (primary, mut pdf) = cx.open_primary(ActionKind::AddText)?;
    let page = page_index(ActionKind::AddText, p.page, pdf.as_ref())?;

    let size = pdf.page_size(page)?;
    let width = pdf.text_width(&p.text, p.font_size);
    let (x, y) = position::resolve(
        p.position,
        width,
        p.font_size,
        size.width,
        size.height,
        cx.config.margin,
    );
    pdf.draw_text(page, &p.text, x, y, &TextStyle::plain(p.font_size))?;
    save_edited(pdf.as_ref(), primary)
}

pub(super) fn whiteout(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: WhiteoutParams = params::extract(ActionKind::Whiteout, parameters)?;
    let (primary, mut pdf) = cx.open_primary(ActionKind::Whiteout)?;
    let page = page_index(ActionKind::Whiteout, p.page, pdf.as_ref())?;

    let size = pdf.page_size(page)?;
    let (x, y) = position::resolve(
        p.position,
        p.width,
        p.height,
        size.width,
        size.height,
        cx.config.margin,
    );
    pdf.draw_rectangle(page, x, y, p.width, p.height, Color::WHITE)?;
    save_edited(pdf.as_ref(), primary)
}

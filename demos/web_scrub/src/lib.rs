// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A long page with three scroll-scrubbed surfaces.
//!
//! - a full-bleed hero behind the whole page, in direct mode, with a
//!   progress bar
//! - a sticky section partway down, smoothed
//! - a small corner logo, smoothed, transparent when no asset loads
//!
//! Build with: `wasm-pack build --target web demos/web_scrub`
//! Then serve `demos/web_scrub/` next to a `videos/` directory holding the
//! assets named in `AssetTable::HERO`, `SECONDARY` and `ACCENT`, and open
//! `index.html`. Missing assets exercise the fallback chain; watch the
//! console for the trace.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use scrubline_backend_web::{MountOptions, ScrubView};
use scrubline_core::config::TimelineConfig;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

const COPY: [&str; 4] = [
    "Scroll to move through the film.",
    "Every frame you see is picked by how far down the page you are.",
    "Scroll back up and it runs backwards. Stop, and it holds still.",
    "At the very top it rests on the first frame.",
];

/// Entry point for the scrub demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let document = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let hero = element(&document, "div")?;
    style(&hero, "position: fixed; inset: 0; z-index: 0;")?;
    body.append_child(&hero)?;

    let page = element(&document, "main")?;
    style(
        &page,
        "position: relative; z-index: 1; font: 500 28px/1.4 system-ui, sans-serif;",
    )?;
    body.append_child(&page)?;

    for line in COPY {
        page.append_child(&panel(&document, line)?)?;
    }

    let section_wrap = element(&document, "section")?;
    style(&section_wrap, "height: 200vh;")?;
    let section = element(&document, "div")?;
    style(
        &section,
        "position: sticky; top: 20vh; height: 60vh; margin: 0 8vw; border-radius: 18px; overflow: hidden;",
    )?;
    section_wrap.append_child(&section)?;
    page.append_child(&section_wrap)?;
    page.append_child(&panel(&document, "That's the end.")?)?;

    let logo = element(&document, "div")?;
    style(
        &logo,
        "position: fixed; right: 24px; bottom: 24px; width: 96px; height: 96px; z-index: 2; border-radius: 50%; overflow: hidden;",
    )?;
    body.append_child(&logo)?;

    let views = [
        ScrubView::mount_with(
            &hero,
            TimelineConfig::full_bleed(),
            MountOptions::default()
                .with_progress_bar()
                .with_trace_label("hero"),
        )?,
        ScrubView::mount_with(
            &section,
            TimelineConfig::secondary(),
            MountOptions::default().with_trace_label("section"),
        )?,
        ScrubView::mount(&logo, TimelineConfig::accent())?,
    ];
    // The page never unmounts.
    core::mem::forget(views);

    Ok(())
}

fn panel(doc: &Document, text: &str) -> Result<HtmlElement, JsValue> {
    let el = element(doc, "p")?;
    style(
        &el,
        "min-height: 100vh; margin: 0; padding: 40vh 8vw 0; box-sizing: border-box; text-shadow: 0 2px 12px rgba(0,0,0,0.6);",
    )?;
    el.set_text_content(Some(text));
    Ok(el)
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}

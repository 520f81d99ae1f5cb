// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use passbook_app::Workbench;
use std::io::Write;
use std::process::{Command, Stdio};

const COPY_HELPERS: [&[&str]; 3] = [
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["pbcopy"],
];
const OPEN_HELPERS: [&str; 2] = ["xdg-open", "open"];

/// Best-effort host integration through whichever helper binaries the
/// platform provides.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWorkbench;

impl Workbench for SystemWorkbench {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        for helper in COPY_HELPERS {
            let Ok(mut child) = Command::new(helper[0])
                .args(&helper[1..])
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            else {
                continue;
            };
            if let Some(stdin) = child.stdin.as_mut() {
                stdin
                    .write_all(text.as_bytes())
                    .context("write to clipboard helper")?;
            }
            drop(child.stdin.take());
            let status = child.wait().context("wait for clipboard helper")?;
            if status.success() {
                return Ok(());
            }
        }
        bail!("no clipboard helper found (tried wl-copy, xclip, pbcopy)");
    }

    fn open_url(&mut self, url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("refusing to open non-http URL {url:?}");
        }
        for helper in OPEN_HELPERS {
            let Ok(status) = Command::new(helper)
                .arg(url)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            else {
                continue;
            };
            if status.success() {
                return Ok(());
            }
        }
        bail!("no URL opener found (tried xdg-open, open)");
    }
}

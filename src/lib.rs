// stream_reply — Incremental terminal rendering for streamed assistant replies
// Copyright (C) 2025  The stream-reply contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod app;
pub mod error;
pub mod render;
pub mod stream;
pub mod transport;
pub mod ui;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use stream::reveal::{DEFAULT_CHARS_PER_TICK, RevealConfig};
use stream::scroll::{DEFAULT_DETACH_THRESHOLD, DEFAULT_REATTACH_THRESHOLD, ScrollThresholds};

#[derive(Parser, Debug)]
#[command(name = "stream-reply", about = "Watch streamed assistant replies render in the terminal")]
pub struct Cli {
    /// Stream endpoint that answers a JSON POST with server-sent events
    #[arg(long, conflicts_with = "replay")]
    pub url: Option<String>,

    /// Replay a reply from a text file instead of a live endpoint
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Assistant category sent with each prompt
    #[arg(long, default_value = "general")]
    pub category: String,

    /// Base burst size in characters for replayed replies
    #[arg(long, default_value_t = transport::replay::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Delay between replayed bursts
    #[arg(long, default_value_t = 40)]
    pub chunk_delay_ms: u64,

    /// Characters revealed per tick
    #[arg(long, default_value_t = DEFAULT_CHARS_PER_TICK)]
    pub chars_per_tick: usize,

    /// Milliseconds between reveal ticks
    #[arg(long, default_value_t = 15)]
    pub tick_ms: u64,

    /// Distance from the bottom, in pixels, past which scrolling up detaches
    #[arg(long, default_value_t = DEFAULT_DETACH_THRESHOLD)]
    pub detach_px: u32,

    /// Distance from the bottom, in pixels, within which the view re-attaches
    #[arg(long, default_value_t = DEFAULT_REATTACH_THRESHOLD)]
    pub reattach_px: u32,

    /// Write tracing output to this file (the terminal UI owns stdout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives; overrides `RUST_LOG`
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long)]
    pub log_append: bool,
}

impl Cli {
    pub fn reveal_config(&self) -> RevealConfig {
        RevealConfig {
            chars_per_tick: self.chars_per_tick.max(1),
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
        }
    }

    pub fn scroll_thresholds(&self) -> ScrollThresholds {
        ScrollThresholds { detach: self.detach_px, reattach: self.reattach_px }
    }
}

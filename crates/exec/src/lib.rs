// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drover-exec: Process execution and lifecycle supervision.
//!
//! Spawns commands inside workspaces — bounded synchronous runs and
//! open-ended detached runs — classifies detached startups from captured
//! output within a fixed observation window, tracks at most one live
//! detached process per workspace, and terminates tracked processes on
//! demand or in bulk.

pub mod classify;
pub mod env;
pub mod registry;
pub mod runner;
pub mod service;
pub mod supervise;
pub mod terminate;

pub use registry::{ProcessRecord, ProcessRegistry};
pub use runner::CommandRunner;
pub use service::ExecService;
pub use supervise::DetachedSupervisor;
pub use terminate::TerminationService;

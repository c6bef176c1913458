// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! System/telemetry information gathered for SCC registration.

pub mod exporter;
pub mod provider;

pub use exporter::InfoExporter;
pub use provider::{InfoProvider, SystemCounts};

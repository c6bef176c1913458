// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for cluster identity discovery.

pub mod identity;

pub use identity::cluster_uuid;

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Engine Module
 * Audit run orchestration
 *
 * © 2026 Bountyy Oy
 */

pub mod audit_engine;

pub use audit_engine::AuditEngine;

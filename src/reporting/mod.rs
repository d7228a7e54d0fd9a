// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod engine;
pub mod mappings;
pub mod types;

pub use engine::{generate_summary_report, render_markdown};
pub use mappings::RecommendationMapper;
pub use types::{Priority, Recommendation, SummaryReport};

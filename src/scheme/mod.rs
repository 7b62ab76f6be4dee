//! Scheme-of-work extraction pipeline: segment a subject's text, ask the model
//! for records chunk by chunk, decode whatever comes back, then dedupe and lay
//! the results out on the term/week grid.

use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::calendar::AcademicCalendar;
use crate::cli::{DecodeFailurePolicy, ExtractArgs};
use crate::error::{DecodeError, InputError};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::model::{ScheduleItem, SubjectCounts, SubjectSchedule};

mod aggregate;
mod config;
mod decode;
mod extractor;
mod report;
mod sections;
mod segment;

pub use aggregate::{SubjectExtraction, aggregate_subject};
pub use config::{ExtractConfig, normalize_subjects};
pub use report::render_report;
pub use sections::{section_or_document, split_subject_sections};

use decode::*;
use extractor::*;
use segment::*;

/// A decoded JSON object from a model response, before normalisation.
pub type Record = Map<String, Value>;

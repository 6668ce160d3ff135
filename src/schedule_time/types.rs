//! Wire and domain types for schedule-time records.

use super::days::{canonical_days, encode_days};
use super::error::ScheduleTimeError;
use super::format::format_range;
use super::validate::{validate_days, validate_times};
use serde::{Deserialize, Serialize};

/// A schedule-time record as stored by the backend.
///
/// `day_group_name` and `range_text` are derived from their source fields:
/// recomputed on every local write, taken as-is when reading server data.
/// `duration_min` is computed by the server only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTime {
    pub id: i64,
    pub days_array: Vec<u8>,
    #[serde(default)]
    pub day_group_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_ext: Option<String>,
    #[serde(default)]
    pub range_text: String,
    #[serde(default)]
    pub duration_min: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

fn default_active() -> bool {
    true
}

impl ScheduleTime {
    /// Checks the day set and the time-ordering invariants.
    pub fn validate(&self) -> Result<(), ScheduleTimeError> {
        validate_days(&self.days_array)?;
        validate_times(
            &self.start_time,
            &self.end_time,
            self.start_time_ext.as_deref(),
            self.end_time_ext.as_deref(),
        )
    }

    /// Recomputes `day_group_name` and `range_text` from their source fields,
    /// canonicalizing the day set in the process.
    pub fn recompute_derived(&mut self) -> Result<(), ScheduleTimeError> {
        self.days_array = canonical_days(&self.days_array);
        self.day_group_name = encode_days(&self.days_array);
        self.range_text = format_range(
            &self.start_time,
            &self.end_time,
            self.start_time_ext.as_deref(),
            self.end_time_ext.as_deref(),
        )?;
        Ok(())
    }
}

/// Payload for creating a schedule time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleTime {
    pub days_array: Vec<u8>,
    #[serde(default)]
    pub day_group_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_ext: Option<String>,
    #[serde(default)]
    pub range_text: String,
    pub is_active: bool,
}

impl NewScheduleTime {
    pub fn new(days: Vec<u8>, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            days_array: days,
            day_group_name: String::new(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            start_time_ext: None,
            end_time_ext: None,
            range_text: String::new(),
            is_active: true,
        }
    }

    pub fn with_extension(
        mut self,
        start_ext: impl Into<String>,
        end_ext: impl Into<String>,
    ) -> Self {
        self.start_time_ext = Some(start_ext.into());
        self.end_time_ext = Some(end_ext.into());
        self
    }

    /// Validates the payload and fills in the derived fields. The result is
    /// exactly what goes on the wire.
    pub fn prepared(mut self) -> Result<Self, ScheduleTimeError> {
        validate_days(&self.days_array)?;
        validate_times(
            &self.start_time,
            &self.end_time,
            self.start_time_ext.as_deref(),
            self.end_time_ext.as_deref(),
        )?;

        self.days_array = canonical_days(&self.days_array);
        self.day_group_name = encode_days(&self.days_array);
        self.range_text = format_range(
            &self.start_time,
            &self.end_time,
            self.start_time_ext.as_deref(),
            self.end_time_ext.as_deref(),
        )?;
        Ok(self)
    }

    /// Placeholder record shown in the list while the create request is in
    /// flight. The server row replaces it on commit.
    pub(crate) fn as_record(&self, temp_id: i64) -> ScheduleTime {
        ScheduleTime {
            id: temp_id,
            days_array: self.days_array.clone(),
            day_group_name: self.day_group_name.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            start_time_ext: self.start_time_ext.clone(),
            end_time_ext: self.end_time_ext.clone(),
            range_text: self.range_text.clone(),
            duration_min: 0,
            is_active: self.is_active,
            is_deleted: false,
        }
    }
}

/// Field-by-field patch for inline edits. Absent fields are left untouched;
/// `Some(None)` on an extension field clears it (serialized as `null`).
///
/// The derived fields are crate-private: only [`ScheduleTimePatch::with_derived`]
/// fills them, from a validated record, so they can never be edited
/// independently of their sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTimePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_array: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) day_group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_ext: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_ext: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) range_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl ScheduleTimePatch {
    pub fn days(days: Vec<u8>) -> Self {
        Self {
            days_array: Some(days),
            ..Self::default()
        }
    }

    pub fn times(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_time: Some(start.into()),
            end_time: Some(end.into()),
            ..Self::default()
        }
    }

    /// Sets or clears the extended range; `None` clears both fields.
    pub fn extension(range: Option<(String, String)>) -> Self {
        let (start, end) = match range {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };
        Self {
            start_time_ext: Some(start),
            end_time_ext: Some(end),
            ..Self::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn deleted(is_deleted: bool) -> Self {
        Self {
            is_deleted: Some(is_deleted),
            ..Self::default()
        }
    }

    /// Applies the patch to a copy of `current`, revalidating the result and
    /// recomputing derived fields. `current` is untouched on failure.
    pub fn apply(&self, current: &ScheduleTime) -> Result<ScheduleTime, ScheduleTimeError> {
        let mut next = current.clone();

        if let Some(days) = &self.days_array {
            next.days_array = days.clone();
        }
        if let Some(v) = &self.start_time {
            next.start_time = v.clone();
        }
        if let Some(v) = &self.end_time {
            next.end_time = v.clone();
        }
        if let Some(v) = &self.start_time_ext {
            next.start_time_ext = v.clone();
        }
        if let Some(v) = &self.end_time_ext {
            next.end_time_ext = v.clone();
        }
        if let Some(v) = self.is_active {
            next.is_active = v;
        }
        if let Some(v) = self.is_deleted {
            next.is_deleted = v;
        }

        next.validate()?;
        next.recompute_derived()?;
        Ok(next)
    }

    /// Copy of the patch with derived fields filled from the applied record,
    /// so the server persists the same `day_group_name`/`range_text` the
    /// client displays.
    pub fn with_derived(&self, applied: &ScheduleTime) -> Self {
        let mut patch = self.clone();

        if patch.days_array.is_some() {
            patch.days_array = Some(applied.days_array.clone());
            patch.day_group_name = Some(applied.day_group_name.clone());
        }

        let touches_times = patch.start_time.is_some()
            || patch.end_time.is_some()
            || patch.start_time_ext.is_some()
            || patch.end_time_ext.is_some();
        if touches_times {
            patch.range_text = Some(applied.range_text.clone());
        }

        patch
    }
}

/// Pagination and filter parameters passed through to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// 1-based page number (`currentPage` on the wire)
    pub current_page: u32,
    /// Requested page size (`pageSize` on the wire)
    pub page_size: u32,
    /// Include soft-deleted records (the recycle bin view)
    pub include_deleted: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: 25,
            include_deleted: false,
        }
    }
}

impl ListQuery {
    pub fn page(current_page: u32, page_size: u32) -> Self {
        Self {
            current_page,
            page_size,
            ..Self::default()
        }
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("currentPage", self.current_page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if self.include_deleted {
            pairs.push(("includeDeleted", "true".to_string()));
        }
        pairs
    }
}

/// One page of list results. The server may return fewer items than
/// requested; callers must not assume a full page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    // Explicit default path: a bare `default` would make the derive demand
    // `T: Default`, which record types do not have.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

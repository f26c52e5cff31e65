//! LookML serialization
//!
//! Layout rules:
//! - two-space indentation, one `key: value` per line
//! - every nested block is preceded by a blank line unless it opens its parent
//! - SQL-bearing keys are terminated with ` ;;`
//! - free-text keys are double-quoted

use dbt2lookml_core::{Dimension, DimensionGroup, Measure, ModelFile, View};

/// Incremental LookML text builder
#[derive(Debug)]
pub struct LookmlWriter {
    out: String,
    depth: usize,
    at_block_start: bool,
}

impl Default for LookmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LookmlWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            at_block_start: true,
        }
    }

    /// Unquoted value: `type: number`
    pub fn pair(&mut self, key: &str, value: &str) -> &mut Self {
        self.line(&format!("{}: {}", key, value))
    }

    /// Quoted value: `description: "..."`
    pub fn quoted(&mut self, key: &str, value: &str) -> &mut Self {
        self.line(&format!("{}: {}", key, quote(value)))
    }

    /// SQL value: `sql: ${TABLE}.id ;;`
    pub fn sql(&mut self, key: &str, value: &str) -> &mut Self {
        self.line(&format!("{}: {} ;;", key, value.trim()))
    }

    /// Bare list: `timeframes: [raw, date]`
    pub fn list<S: AsRef<str>>(&mut self, key: &str, items: &[S]) -> &mut Self {
        let items: Vec<&str> = items.iter().map(|s| s.as_ref()).collect();
        self.line(&format!("{}: [{}]", key, items.join(", ")))
    }

    /// Field filter list: `filters: [status: "completed"]`
    pub fn filters<'a>(&mut self, key: &str, filters: impl IntoIterator<Item = (&'a str, &'a str)>) -> &mut Self {
        let entries: Vec<String> = filters
            .into_iter()
            .map(|(field, expression)| format!("{}: {}", field, quote(expression)))
            .collect();
        self.line(&format!("{}: [{}]", key, entries.join(", ")))
    }

    /// Named block: `dimension: id { ... }`
    pub fn block(&mut self, key: &str, name: &str, body: impl FnOnce(&mut Self)) -> &mut Self {
        if !self.at_block_start {
            self.out.push('\n');
        }
        self.line(&format!("{}: {} {{", key, name));
        self.depth += 1;
        self.at_block_start = true;
        body(self);
        self.depth -= 1;
        self.line("}")
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) -> &mut Self {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
        self.at_block_start = false;
        self
    }
}

/// Quote a LookML string literal
///
/// Line breaks are written as-is.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

/// Render a view file
pub fn dump_view(view: &View) -> String {
    let mut w = LookmlWriter::new();
    w.block("view", &view.name, |w| {
        w.sql("sql_table_name", &view.sql_table_name);
        for group in &view.dimension_groups {
            write_dimension_group(w, group);
        }
        for dimension in &view.dimensions {
            write_dimension(w, dimension);
        }
        for measure in &view.measures {
            write_measure(w, measure);
        }
    });
    w.finish()
}

/// Render a model file
pub fn dump_model(model: &ModelFile) -> String {
    let mut w = LookmlWriter::new();
    w.quoted("connection", &model.connection);
    w.quoted("include", &model.include);

    let explore = &model.explore;
    w.block("explore", &explore.name, |w| {
        w.quoted("description", &explore.description);
        for join in &explore.joins {
            w.block("join", &join.name, |w| {
                w.pair("type", join.join_type.as_str());
                w.pair("relationship", join.relationship.as_str());
                w.sql("sql_on", &join.sql_on);
                w.quoted("view_label", &join.view_label);
            });
        }
    });
    w.finish()
}

fn write_dimension_group(w: &mut LookmlWriter, group: &DimensionGroup) {
    w.block("dimension_group", &group.name, |w| {
        w.pair("type", "time");
        w.sql("sql", &group.sql);
        w.quoted("description", &group.description);
        w.pair("datatype", group.datatype.as_str());
        let timeframes: Vec<&str> = group.timeframes.iter().map(|t| t.as_str()).collect();
        w.list("timeframes", &timeframes);
    });
}

fn write_dimension(w: &mut LookmlWriter, dimension: &Dimension) {
    w.block("dimension", &dimension.name, |w| {
        w.pair("type", dimension.looker_type.as_str());
        w.sql("sql", &dimension.sql);
        w.quoted("description", &dimension.description);
        if let Some(format) = dimension.value_format_name {
            w.pair("value_format_name", format.as_str());
        }
        if dimension.primary_key {
            w.pair("primary_key", "yes");
        }
        if dimension.hidden {
            w.pair("hidden", "yes");
        }
    });
}

fn write_measure(w: &mut LookmlWriter, measure: &Measure) {
    w.block("measure", &measure.name, |w| {
        w.pair("type", measure.measure_type.as_str());
        w.sql("sql", &measure.sql);
        w.quoted("description", &measure.description);
        if !measure.filters.is_empty() {
            w.filters(
                "filters",
                measure.filters.iter().map(|f| (f.field.as_str(), f.expression.as_str())),
            );
        }
        if let Some(format) = measure.value_format_name {
            w.pair("value_format_name", format.as_str());
        }
        if let Some(group_label) = &measure.group_label {
            w.quoted("group_label", group_label);
        }
        if let Some(label) = &measure.label {
            w.quoted("label", label);
        }
        if let Some(hidden) = measure.hidden {
            w.pair("hidden", hidden.as_str());
        }
        if !measure.drill_fields.is_empty() {
            w.list("drill_fields", &measure.drill_fields);
        }
    });
}

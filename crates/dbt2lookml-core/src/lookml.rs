//! LookML intermediate representation
//!
//! Typed model of the LookML objects this tool emits. The enums double as
//! the validated vocabulary of dbt `meta` blocks, so their serde names are
//! the exact LookML keywords.

use serde::{Deserialize, Serialize};

/// LookML field type derived from a warehouse column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookerType {
    Number,
    String,
    Yesno,
    Date,
    Datetime,
    Timestamp,
}

impl LookerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Yesno => "yesno",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Timestamp => "timestamp",
        }
    }

    /// Types rendered as a plain `dimension`
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Number | Self::String | Self::Yesno)
    }

    /// Types rendered as a `dimension_group` with time-of-day timeframes
    pub fn is_date_time(&self) -> bool {
        matches!(self, Self::Datetime | Self::Timestamp)
    }
}

impl std::fmt::Display for LookerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measure aggregation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    Number,
    String,
    Average,
    AverageDistinct,
    Count,
    CountDistinct,
    List,
    Max,
    Median,
    MedianDistinct,
    Min,
    Sum,
    SumDistinct,
}

impl MeasureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Average => "average",
            Self::AverageDistinct => "average_distinct",
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::List => "list",
            Self::Max => "max",
            Self::Median => "median",
            Self::MedianDistinct => "median_distinct",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::SumDistinct => "sum_distinct",
        }
    }

    /// Keyword with its first letter upper-cased, e.g. "Count_distinct"
    pub fn capitalized(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for MeasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explore join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    #[default]
    LeftOuter,
    FullOuter,
    Inner,
    Cross,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftOuter => "left_outer",
            Self::FullOuter => "full_outer",
            Self::Inner => "inner",
            Self::Cross => "cross",
        }
    }
}

/// Explore join cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRelationship {
    #[default]
    ManyToOne,
    ManyToMany,
    OneToMany,
    OneToOne,
}

impl JoinRelationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManyToOne => "many_to_one",
            Self::ManyToMany => "many_to_many",
            Self::OneToMany => "one_to_many",
            Self::OneToOne => "one_to_one",
        }
    }
}

/// Named value formats accepted by Looker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormatName {
    #[serde(rename = "decimal_0")]
    Decimal0,
    #[serde(rename = "decimal_1")]
    Decimal1,
    #[serde(rename = "decimal_2")]
    Decimal2,
    #[serde(rename = "decimal_3")]
    Decimal3,
    #[serde(rename = "decimal_4")]
    Decimal4,
    #[serde(rename = "usd_0")]
    Usd0,
    Usd,
    #[serde(rename = "gbp_0")]
    Gbp0,
    Gbp,
    #[serde(rename = "eur_0")]
    Eur0,
    Eur,
    Id,
    #[serde(rename = "percent_0")]
    Percent0,
    #[serde(rename = "percent_1")]
    Percent1,
    #[serde(rename = "percent_2")]
    Percent2,
    #[serde(rename = "percent_3")]
    Percent3,
    #[serde(rename = "percent_4")]
    Percent4,
}

impl ValueFormatName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decimal0 => "decimal_0",
            Self::Decimal1 => "decimal_1",
            Self::Decimal2 => "decimal_2",
            Self::Decimal3 => "decimal_3",
            Self::Decimal4 => "decimal_4",
            Self::Usd0 => "usd_0",
            Self::Usd => "usd",
            Self::Gbp0 => "gbp_0",
            Self::Gbp => "gbp",
            Self::Eur0 => "eur_0",
            Self::Eur => "eur",
            Self::Id => "id",
            Self::Percent0 => "percent_0",
            Self::Percent1 => "percent_1",
            Self::Percent2 => "percent_2",
            Self::Percent3 => "percent_3",
            Self::Percent4 => "percent_4",
        }
    }
}

/// LookML yes/no flag as written in measure meta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hidden {
    Yes,
    No,
}

impl Hidden {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// Dimension group timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Raw,
    Time,
    Hour,
    Date,
    Week,
    Month,
    Quarter,
    Year,
}

impl Timeframe {
    /// Timeframes for timestamp and datetime columns
    pub const DATE_TIME: [Timeframe; 8] = [
        Timeframe::Raw,
        Timeframe::Time,
        Timeframe::Hour,
        Timeframe::Date,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Quarter,
        Timeframe::Year,
    ];

    /// Timeframes for date-only columns
    pub const DATE: [Timeframe; 6] = [
        Timeframe::Raw,
        Timeframe::Date,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Quarter,
        Timeframe::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Time => "time",
            Self::Hour => "hour",
            Self::Date => "date",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

/// A plain `dimension`
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub looker_type: LookerType,
    pub sql: String,
    pub description: String,
    pub value_format_name: Option<ValueFormatName>,
    pub primary_key: bool,
    pub hidden: bool,
}

/// A `dimension_group` of `type: time`
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionGroup {
    pub name: String,
    pub sql: String,
    pub description: String,
    pub datatype: LookerType,
    pub timeframes: Vec<Timeframe>,
}

/// One `field: "expression"` entry of a measure's filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureFilter {
    pub field: String,
    pub expression: String,
}

/// A `measure`
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub name: String,
    pub measure_type: MeasureType,
    pub sql: String,
    pub description: String,
    pub filters: Vec<MeasureFilter>,
    pub value_format_name: Option<ValueFormatName>,
    pub group_label: Option<String>,
    pub label: Option<String>,
    pub hidden: Option<Hidden>,
    pub drill_fields: Vec<String>,
}

/// A LookML `view`
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: String,
    pub sql_table_name: String,
    pub dimension_groups: Vec<DimensionGroup>,
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
}

/// An explore `join`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub name: String,
    pub join_type: JoinType,
    pub relationship: JoinRelationship,
    pub sql_on: String,
    pub view_label: String,
}

/// An `explore`
#[derive(Debug, Clone, PartialEq)]
pub struct Explore {
    pub name: String,
    pub description: String,
    pub joins: Vec<Join>,
}

/// Contents of a `.model.lkml` file
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile {
    pub connection: String,
    pub include: String,
    pub explore: Explore,
}

/// A rendered LookML file ready to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookmlFile {
    /// Directory relative to the output root (empty for the root itself)
    pub directory: String,

    /// File name, e.g. "orders.view.lkml"
    pub filename: String,

    /// Serialized LookML
    pub contents: String,
}

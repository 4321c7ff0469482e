use serde::{Deserialize, Serialize};

use crate::error::AmbiguousColumnType;

// ════════════════════════════════════════════════════════════════
//  Column metadata
// ════════════════════════════════════════════════════════════════

/// Метаданные одной выходной колонки. Без дескриптора значение
/// колонки ([`Datum`]) неинтерпретируемо.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub column_type: ColumnType,
}

/// Самоописывающийся тип колонки в wire-форме: четыре опциональных
/// индикатора формы, рекурсивных для вложенных типов.
///
/// Well-formed дескриптор несёт ровно один индикатор; проверка — в
/// [`ColumnType::kind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_column_info: Option<Box<ColumnInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_column_info: Option<Vec<ColumnInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series_measure_value_column_info: Option<Box<ColumnInfo>>,
}

/// Классифицированная форма колонки. Закрытый набор: декодер матчится
/// по нему исчерпывающе, не заглядывая в форму самого значения.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind<'a> {
    Scalar(&'a str),
    Array(&'a ColumnInfo),
    Row(&'a [ColumnInfo]),
    TimeSeries(&'a ColumnInfo),
}

impl ColumnType {
    /// Классифицировать тип. Ошибка, если индикаторов не ровно один —
    /// дефолта в Scalar здесь нет намеренно.
    pub fn kind(&self) -> Result<ColumnKind<'_>, AmbiguousColumnType> {
        let mut indicators = 0usize;
        let mut kind = None;
        if let Some(ref s) = self.scalar_type {
            indicators += 1;
            kind = Some(ColumnKind::Scalar(s.as_str()));
        }
        if let Some(ref inner) = self.array_column_info {
            indicators += 1;
            kind = Some(ColumnKind::Array(inner.as_ref()));
        }
        if let Some(ref fields) = self.row_column_info {
            // Пустой список полей — валидный Row индикатор (рендерится "{}").
            indicators += 1;
            kind = Some(ColumnKind::Row(fields.as_slice()));
        }
        if let Some(ref measure) = self.time_series_measure_value_column_info {
            indicators += 1;
            kind = Some(ColumnKind::TimeSeries(measure.as_ref()));
        }
        match (indicators, kind) {
            (1, Some(kind)) => Ok(kind),
            _ => Err(AmbiguousColumnType { indicators }),
        }
    }
}

impl ColumnInfo {
    /// Скалярная колонка с именем.
    pub fn scalar(name: impl Into<String>, scalar_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            column_type: ColumnType { scalar_type: Some(scalar_type.into()), ..Default::default() },
        }
    }

    /// Скалярная колонка без имени (элемент массива, measure value).
    pub fn unnamed_scalar(scalar_type: impl Into<String>) -> Self {
        Self {
            name: None,
            column_type: ColumnType { scalar_type: Some(scalar_type.into()), ..Default::default() },
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Values
// ════════════════════════════════════════════════════════════════

/// Одно значение ячейки в wire-форме. Union через опциональные поля;
/// какое из них должно быть заполнено, диктует парный [`ColumnInfo`],
/// сам по себе Datum самодостаточным не является.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Datum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_value: Option<Vec<Datum>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_value: Option<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series_value: Option<Vec<TimeSeriesDataPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<bool>,
}

impl Datum {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self { scalar_value: Some(value.into()), ..Default::default() }
    }

    pub fn array(values: Vec<Datum>) -> Self {
        Self { array_value: Some(values), ..Default::default() }
    }

    pub fn row(data: Vec<Datum>) -> Self {
        Self { row_value: Some(Row { data }), ..Default::default() }
    }

    pub fn time_series(points: Vec<TimeSeriesDataPoint>) -> Self {
        Self { time_series_value: Some(points), ..Default::default() }
    }

    pub fn null() -> Self {
        Self { null_value: Some(true), ..Default::default() }
    }

    /// Явно помеченное NULL значение.
    pub fn is_null(&self) -> bool {
        self.null_value == Some(true)
    }
}

/// Строка результата: значения в позиционном соответствии со списком
/// дескрипторов страницы.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Row {
    #[serde(default)]
    pub data: Vec<Datum>,
}

/// Точка time-series значения: timestamp + вложенное значение,
/// декодируемое против measure-value дескриптора колонки.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesDataPoint {
    pub time: String,
    pub value: Datum,
}

// ════════════════════════════════════════════════════════════════
//  Pages
// ════════════════════════════════════════════════════════════════

/// Прогресс выполнения запроса, приходит с каждой страницей.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryStatus {
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub cumulative_bytes_scanned: i64,
    #[serde(default)]
    pub cumulative_bytes_metered: i64,
}

/// Одна страница результата запроса. Страницы приходят лениво
/// (forward-only, по `next_token`) и после рендеринга не хранятся.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryPage {
    #[serde(default)]
    pub query_status: QueryStatus,
    #[serde(default)]
    pub column_info: Vec<ColumnInfo>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

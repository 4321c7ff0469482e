use rankstream_api::error::AmbiguousColumnType;
use rankstream_api::query::{ColumnInfo, ColumnKind, Datum, Row};

// ════════════════════════════════════════════════════════════════
//  Decode errors
// ════════════════════════════════════════════════════════════════

/// Ошибка декодирования пары (дескриптор, значение).
///
/// Для well-formed входа декодер не ошибается никогда; любой из этих
/// вариантов — нарушение контракта движком запросов. Страница после
/// ошибки бросается, уже отрендеренные строки остаются (best-effort
/// observability).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("column '{column}': {source}")]
    AmbiguousType {
        column: String,
        #[source]
        source: AmbiguousColumnType,
    },

    /// Дескриптор объявляет одну форму, значение несёт другую.
    /// Коэрсии нет намеренно: расхождение репортится наверх.
    #[error("column '{column}': descriptor says {expected}, cell carries no {expected} value")]
    ShapeMismatch { column: String, expected: &'static str },

    #[error("row carries {actual} values for {expected} columns")]
    RowArity { expected: usize, actual: usize },
}

fn column_label(info: &ColumnInfo) -> String {
    info.name.clone().unwrap_or_else(|| "<unnamed>".to_string())
}

/// `"<name>="` для именованной колонки, пусто для безымянной.
fn column_prefix(info: &ColumnInfo) -> String {
    match info.name {
        Some(ref name) => format!("{name}="),
        None => String::new(),
    }
}

// ════════════════════════════════════════════════════════════════
//  Recursive rendering
// ════════════════════════════════════════════════════════════════

/// Отрендерить одну строку результата против списка дескрипторов.
///
/// Top-level строка — это Row-случай над полным списком колонок:
/// одна `{...}`-обёрнутая строка на row.
pub fn decode_row(columns: &[ColumnInfo], row: &Row) -> Result<String, DecodeError> {
    decode_fields(columns, &row.data)
}

fn decode_fields(columns: &[ColumnInfo], data: &[Datum]) -> Result<String, DecodeError> {
    if columns.len() != data.len() {
        return Err(DecodeError::RowArity { expected: columns.len(), actual: data.len() });
    }
    let mut rendered = Vec::with_capacity(columns.len());
    for (info, datum) in columns.iter().zip(data) {
        rendered.push(decode_datum(info, datum)?);
    }
    Ok(format!("{{{}}}", rendered.join(",")))
}

/// Рекурсивное ядро: диспетчеризация строго по форме дескриптора,
/// не по runtime-форме значения. Пустой Row и отсутствующее поле
/// well-formed движок может представить одинаково, поэтому по самому
/// значению выводить поведение нельзя.
fn decode_datum(info: &ColumnInfo, datum: &Datum) -> Result<String, DecodeError> {
    if datum.is_null() {
        return Ok(format!("{}NULL", column_prefix(info)));
    }

    let kind = info.column_type.kind().map_err(|source| DecodeError::AmbiguousType {
        column: column_label(info),
        source,
    })?;

    match kind {
        ColumnKind::TimeSeries(measure) => {
            let points = datum.time_series_value.as_ref().ok_or_else(|| {
                DecodeError::ShapeMismatch { column: column_label(info), expected: "time series" }
            })?;
            // Имя колонки не префиксуется даже у именованной time-series
            // колонки (wire-совместимое поведение).
            let mut rendered = Vec::with_capacity(points.len());
            for point in points {
                rendered.push(format!(
                    "{{time={}, value={}}}",
                    point.time,
                    decode_datum(measure, &point.value)?
                ));
            }
            Ok(format!("[{}]", rendered.join(",")))
        }
        ColumnKind::Array(element) => {
            let values = datum.array_value.as_ref().ok_or_else(|| {
                DecodeError::ShapeMismatch { column: column_label(info), expected: "array" }
            })?;
            let mut rendered = Vec::with_capacity(values.len());
            for value in values {
                rendered.push(decode_datum(element, value)?);
            }
            Ok(format!("{}[{}]", column_prefix(info), rendered.join(",")))
        }
        ColumnKind::Row(fields) => {
            let row = datum.row_value.as_ref().ok_or_else(|| {
                DecodeError::ShapeMismatch { column: column_label(info), expected: "row" }
            })?;
            // Имя самого Row отбрасывается, имена несут только поля.
            decode_fields(fields, &row.data)
        }
        ColumnKind::Scalar(_) => {
            let value = datum.scalar_value.as_ref().ok_or_else(|| {
                DecodeError::ShapeMismatch { column: column_label(info), expected: "scalar" }
            })?;
            // Сырой текст как есть: без парсинга чисел и локалей.
            Ok(format!("{}{}", column_prefix(info), value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankstream_api::query::{ColumnType, TimeSeriesDataPoint};

    fn array_of(element: ColumnInfo, name: Option<&str>) -> ColumnInfo {
        ColumnInfo {
            name: name.map(str::to_string),
            column_type: ColumnType {
                array_column_info: Some(Box::new(element)),
                ..Default::default()
            },
        }
    }

    fn row_of(fields: Vec<ColumnInfo>, name: Option<&str>) -> ColumnInfo {
        ColumnInfo {
            name: name.map(str::to_string),
            column_type: ColumnType { row_column_info: Some(fields), ..Default::default() },
        }
    }

    fn time_series_of(measure: ColumnInfo, name: Option<&str>) -> ColumnInfo {
        ColumnInfo {
            name: name.map(str::to_string),
            column_type: ColumnType {
                time_series_measure_value_column_info: Some(Box::new(measure)),
                ..Default::default()
            },
        }
    }

    #[test]
    fn named_scalar() {
        let columns = [ColumnInfo::scalar("rank", "BIGINT")];
        let row = Row { data: vec![Datum::scalar("7")] };
        assert_eq!(decode_row(&columns, &row).unwrap(), "{rank=7}");
    }

    #[test]
    fn scalar_text_passes_through_unmodified() {
        let columns = [ColumnInfo::scalar("v", "DOUBLE")];
        let row = Row { data: vec![Datum::scalar("0012.500")] };
        assert_eq!(decode_row(&columns, &row).unwrap(), "{v=0012.500}");
    }

    #[test]
    fn unnamed_array() {
        let columns = [array_of(ColumnInfo::unnamed_scalar("BIGINT"), None)];
        let row = Row { data: vec![Datum::array(vec![Datum::scalar("1"), Datum::scalar("2")])] };
        assert_eq!(decode_row(&columns, &row).unwrap(), "{[1,2]}");
    }

    #[test]
    fn named_array_carries_prefix() {
        let columns = [array_of(ColumnInfo::unnamed_scalar("BIGINT"), Some("ids"))];
        let row = Row { data: vec![Datum::array(vec![Datum::scalar("1"), Datum::scalar("2")])] };
        assert_eq!(decode_row(&columns, &row).unwrap(), "{ids=[1,2]}");
    }

    #[test]
    fn array_is_length_preserving() {
        let columns = [array_of(ColumnInfo::unnamed_scalar("BIGINT"), None)];
        for n in [0usize, 1, 5] {
            let values = (0..n).map(|i| Datum::scalar(i.to_string())).collect();
            let row = Row { data: vec![Datum::array(values)] };
            let out = decode_row(&columns, &row).unwrap();
            let inner = out.trim_start_matches("{[").trim_end_matches("]}");
            let count = if inner.is_empty() { 0 } else { inner.split(',').count() };
            assert_eq!(count, n);
        }
    }

    #[test]
    fn null_renders_under_every_kind() {
        let cases = [
            ColumnInfo::scalar("a", "BIGINT"),
            array_of(ColumnInfo::unnamed_scalar("BIGINT"), Some("a")),
            row_of(vec![ColumnInfo::scalar("x", "BIGINT")], Some("a")),
            time_series_of(ColumnInfo::unnamed_scalar("DOUBLE"), Some("a")),
        ];
        for info in cases {
            assert_eq!(decode_datum(&info, &Datum::null()).unwrap(), "a=NULL");
        }
        let unnamed = ColumnInfo::unnamed_scalar("BIGINT");
        assert_eq!(decode_datum(&unnamed, &Datum::null()).unwrap(), "NULL");
    }

    #[test]
    fn nested_row_preserves_field_order() {
        let columns = [row_of(
            vec![ColumnInfo::scalar("x", "BIGINT"), ColumnInfo::scalar("y", "BIGINT")],
            Some("dropped_name"),
        )];
        let row = Row { data: vec![Datum::row(vec![Datum::scalar("1"), Datum::scalar("2")])] };
        // Имя Row отброшено, поля в позиционном порядке.
        assert_eq!(decode_row(&columns, &row).unwrap(), "{{x=1,y=2}}");
    }

    #[test]
    fn time_series_rendering() {
        let columns = [time_series_of(ColumnInfo::unnamed_scalar("DOUBLE"), Some("points"))];
        let row = Row {
            data: vec![Datum::time_series(vec![
                TimeSeriesDataPoint { time: "2021-04-01 17:43:00.000000000".into(), value: Datum::scalar("1.5") },
                TimeSeriesDataPoint { time: "2021-04-01 17:44:00.000000000".into(), value: Datum::scalar("2.5") },
            ])],
        };
        assert_eq!(
            decode_row(&columns, &row).unwrap(),
            "{[{time=2021-04-01 17:43:00.000000000, value=1.5},{time=2021-04-01 17:44:00.000000000, value=2.5}]}"
        );
    }

    #[test]
    fn empty_row_descriptor_renders_braces() {
        let columns = [row_of(vec![], None)];
        let row = Row { data: vec![Datum::row(vec![])] };
        assert_eq!(decode_row(&columns, &row).unwrap(), "{{}}");
    }

    #[test]
    fn decode_is_deterministic() {
        let columns = [
            ColumnInfo::scalar("rank", "BIGINT"),
            array_of(ColumnInfo::unnamed_scalar("VARCHAR"), Some("tags")),
        ];
        let row = Row {
            data: vec![
                Datum::scalar("3"),
                Datum::array(vec![Datum::scalar("a"), Datum::null()]),
            ],
        };
        let first = decode_row(&columns, &row).unwrap();
        for _ in 0..10 {
            assert_eq!(decode_row(&columns, &row).unwrap(), first);
        }
        assert_eq!(first, "{rank=3,tags=[a,NULL]}");
    }

    #[test]
    fn shape_mismatch_is_reported_not_coerced() {
        // Дескриптор Array, значение — скаляр.
        let columns = [array_of(ColumnInfo::unnamed_scalar("BIGINT"), Some("ids"))];
        let row = Row { data: vec![Datum::scalar("1")] };
        let err = decode_row(&columns, &row).unwrap_err();
        assert!(matches!(err, DecodeError::ShapeMismatch { expected: "array", .. }));
    }

    #[test]
    fn ambiguous_descriptor_is_an_error() {
        let info = ColumnInfo {
            name: Some("bad".into()),
            column_type: ColumnType {
                scalar_type: Some("BIGINT".into()),
                row_column_info: Some(vec![]),
                ..Default::default()
            },
        };
        let err = decode_datum(&info, &Datum::scalar("1")).unwrap_err();
        assert!(matches!(err, DecodeError::AmbiguousType { .. }));
    }

    #[test]
    fn row_arity_mismatch_is_an_error() {
        let columns = [ColumnInfo::scalar("a", "BIGINT"), ColumnInfo::scalar("b", "BIGINT")];
        let row = Row { data: vec![Datum::scalar("1")] };
        let err = decode_row(&columns, &row).unwrap_err();
        assert!(matches!(err, DecodeError::RowArity { expected: 2, actual: 1 }));
    }
}

use chrono::NaiveDateTime;

use crate::error::SourceError;
use crate::write::{Dimension, MeasureValueType, Record};

// ════════════════════════════════════════════════════════════════
//  Enum columns
// ════════════════════════════════════════════════════════════════

/// Тип чарта. В источнике хранится плотным целочисленным кодом с нуля.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingType {
    TopFree,
    TopPaid,
    TopGrossing,
}

impl RankingType {
    /// Код из реляционной колонки `ranking_type`. Код вне набора —
    /// ошибка декодирования, не паника по индексу.
    pub fn from_code(code: i32) -> Result<Self, SourceError> {
        match code {
            0 => Ok(Self::TopFree),
            1 => Ok(Self::TopPaid),
            2 => Ok(Self::TopGrossing),
            _ => Err(SourceError::UnknownCode { column: "ranking_type", code }),
        }
    }

    /// Имя для dimension value (стабильная wire-форма).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopFree => "TOP_FREE",
            Self::TopPaid => "TOP_PAID",
            Self::TopGrossing => "TOP_GROSSING",
        }
    }
}

/// Целевое устройство чарта.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDevice {
    Iphone,
    Ipad,
}

impl TargetDevice {
    /// Код из реляционной колонки `target_device`.
    pub fn from_code(code: i32) -> Result<Self, SourceError> {
        match code {
            0 => Ok(Self::Iphone),
            1 => Ok(Self::Ipad),
            _ => Err(SourceError::UnknownCode { column: "target_device", code }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iphone => "IPHONE",
            Self::Ipad => "IPAD",
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Domain record
// ════════════════════════════════════════════════════════════════

/// Одна строка рейтинга из реляционного источника. Создаётся
/// экстрактором, после конвертации в [`Record`] отбрасывается,
/// не мутируется.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRanking {
    pub track_id: i64,
    pub country_code: String,
    pub category_id: i32,
    pub target_device: TargetDevice,
    pub ranking_type: RankingType,
    /// Naive-local в источнике; при записи реинтерпретируется как UTC.
    pub date: NaiveDateTime,
    pub rank: i32,
}

impl CategoryRanking {
    /// Детерминированная 1:1 конвертация в write-форму.
    ///
    /// Timestamp: naive date-time источника реинтерпретируется как UTC
    /// и переводится в epoch-миллисекунды. Никакой конвертации зон
    /// сверх реинтерпретации не выполняется.
    pub fn to_record(&self) -> Record {
        Record {
            dimensions: vec![
                Dimension::new("track_id", self.track_id.to_string()),
                Dimension::new("category_id", self.category_id.to_string()),
                Dimension::new("country_code", self.country_code.clone()),
                Dimension::new("ranking_type", self.ranking_type.as_str()),
                Dimension::new("target_device", self.target_device.as_str()),
            ],
            measure_name: "rank".to_string(),
            measure_value: self.rank.to_string(),
            measure_value_type: MeasureValueType::Bigint,
            time: self.date.and_utc().timestamp_millis().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> CategoryRanking {
        CategoryRanking {
            track_id: 284882215,
            country_code: "US".into(),
            category_id: 6005,
            target_device: TargetDevice::Iphone,
            ranking_type: RankingType::TopFree,
            date: NaiveDate::from_ymd_opt(2021, 4, 2).unwrap().and_hms_opt(14, 27, 0).unwrap(),
            rank: 7,
        }
    }

    #[test]
    fn enum_codes_resolve() {
        assert_eq!(RankingType::from_code(0).unwrap(), RankingType::TopFree);
        assert_eq!(RankingType::from_code(2).unwrap(), RankingType::TopGrossing);
        assert_eq!(TargetDevice::from_code(1).unwrap(), TargetDevice::Ipad);
    }

    #[test]
    fn out_of_range_code_is_an_error() {
        let err = RankingType::from_code(7).unwrap_err();
        assert!(matches!(err, SourceError::UnknownCode { column: "ranking_type", code: 7 }));
        assert!(TargetDevice::from_code(-1).is_err());
    }

    #[test]
    fn to_record_flattens_dimensions() {
        let record = sample().to_record();
        let names: Vec<&str> = record.dimensions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["track_id", "category_id", "country_code", "ranking_type", "target_device"]);
        assert_eq!(record.dimensions[3].value, "TOP_FREE");
        assert_eq!(record.measure_name, "rank");
        assert_eq!(record.measure_value, "7");
        assert_eq!(record.measure_value_type, MeasureValueType::Bigint);
    }

    #[test]
    fn timestamp_is_utc_reinterpretation() {
        // 2021-04-02T14:27:00, взятое как UTC, без смещения зон.
        let record = sample().to_record();
        assert_eq!(record.time, "1617373620000");
    }
}

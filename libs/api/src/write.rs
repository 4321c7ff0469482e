use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Write-side wire types
// ════════════════════════════════════════════════════════════════

/// Именованный строковый атрибут записи; идентичность/группировка
/// на стороне store при чтении.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Тип measure-значения. Store хранит значение строкой, тип задаёт
/// интерпретацию.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasureValueType {
    Bigint,
    Double,
    Varchar,
    Boolean,
}

/// Плоская запись для отправки в time-series store: набор dimensions +
/// один (measure, timestamp). Выводится из доменной записи 1:1, epoch
/// timestamp всегда UTC-нормализован до построения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub dimensions: Vec<Dimension>,
    pub measure_name: String,
    pub measure_value: String,
    pub measure_value_type: MeasureValueType,
    /// Epoch-миллисекунды, строкой (wire-формат store).
    pub time: String,
}

/// Отклонённая store'ом запись внутри частично успешного batch'а.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RejectedRecord {
    /// Позиция записи в отправленном batch'е.
    pub record_index: usize,
    #[serde(default)]
    pub reason: String,
}

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Value types a test point can assert on, in wire order. Reports carry the
/// integer index, not the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u64")]
pub enum ValueType {
    Byte,
    UByte,
    Half,
    UHalf,
    Word,
    UWord,
    DWord,
    UDWord,
    Float,
    Double,
    RCode,
    Pointer,
}

impl ValueType {
    const ALL: [ValueType; 12] = [
        ValueType::Byte,
        ValueType::UByte,
        ValueType::Half,
        ValueType::UHalf,
        ValueType::Word,
        ValueType::UWord,
        ValueType::DWord,
        ValueType::UDWord,
        ValueType::Float,
        ValueType::Double,
        ValueType::RCode,
        ValueType::Pointer,
    ];

    const NAMES: [&'static str; 12] = [
        "BYTE", "UBYTE", "HALF", "UHALF", "WORD", "UWORD", "DWORD", "UDWORD", "FLOAT", "DOUBLE",
        "RCODE", "POINTER",
    ];
}

impl TryFrom<u64> for ValueType {
    type Error = String;

    fn try_from(index: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| format!("unknown test value type index {index}"))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAMES[*self as usize])
    }
}

/// Outcome of a single test point. The test id is the key of the report's
/// case map, not a field here.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseResult {
    #[serde(deserialize_with = "bool_from_int")]
    pub status: bool,
    pub expected: u64,
    pub result: u64,
    pub r#type: ValueType,
}

/// One suite report as embedded in the run output. `failures` is taken at
/// face value and drives the verdict; it is not re-derived from the cases.
#[derive(Debug, Clone, Deserialize)]
pub struct TestSuiteReport {
    pub version: String,
    pub name: String,
    pub number_of_tests: u32,
    pub success: u32,
    pub failures: u32,
    #[serde(rename = "test_suite", deserialize_with = "unique_cases")]
    pub cases: IndexMap<String, TestCaseResult>,
}

/// Why a group's cycle ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupVerdict {
    Passed,
    TestFailures(u32),
    BuildFailed,
    RunFailed,
    ReportMissing,
    ReportMalformed,
}

impl GroupVerdict {
    pub fn passed(&self) -> bool {
        matches!(self, GroupVerdict::Passed)
    }
}

/// Campaign-wide aggregate. The final `error` count is the process exit
/// status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignSummary {
    pub total: u32,
    pub success: u32,
    pub error: u32,
}

// The framework prints status as 0/1.
fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64::deserialize(deserializer)?;
    Ok(value != 0)
}

// A repeated test id means the report itself is broken; reject the whole
// parse instead of letting a later entry shadow an earlier one.
fn unique_cases<'de, D>(deserializer: D) -> Result<IndexMap<String, TestCaseResult>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CaseMapVisitor;

    impl<'de> Visitor<'de> for CaseMapVisitor {
        type Value = IndexMap<String, TestCaseResult>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of test ids to case results")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut cases = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, case)) = map.next_entry::<String, TestCaseResult>()? {
                if cases.insert(id.clone(), case).is_some() {
                    return Err(de::Error::custom(format!("duplicate test id \"{id}\"")));
                }
            }
            Ok(cases)
        }
    }

    deserializer.deserialize_map(CaseMapVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_decoding() {
        assert_eq!(ValueType::try_from(0_u64), Ok(ValueType::Byte));
        assert_eq!(ValueType::try_from(11_u64), Ok(ValueType::Pointer));
        assert_eq!(ValueType::Pointer.to_string(), "POINTER");
        assert!(ValueType::try_from(12_u64).is_err());
    }
}

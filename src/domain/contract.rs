//! Bindings for the instructor registry contract.
//!
//! The contract exposes a single write, `setInfo(name, age)`, which emits
//! `InstructorCreated(id, name, age)`. Receipts are scanned log by log; any
//! log that is not a well-formed `InstructorCreated` is skipped.
//!
//! Three views read the registry back: `getPersonById`, `getLatestPerson`
//! and `getPersonCount`.

use alloy_primitives::{Address, Bytes, Log, U256, address};
use alloy_sol_types::{SolCall, SolEvent, sol};

use super::DashError;
use crate::client::RpcLog;

sol! {
    function setInfo(string name, uint256 age) external returns (uint256);

    function getPersonById(uint256 id) external view returns (string name, uint256 age);
    function getLatestPerson() external view returns (string name, uint256 age);
    function getPersonCount() external view returns (uint256 count);

    event InstructorCreated(uint256 indexed id, string name, uint256 indexed age);
}

/// Deployment of the registry on Sepolia.
pub const INFO_CONTRACT_ADDRESS: Address = address!("5d66ac89CB632c4354bd205545c71f9DEfFB4384");

/// Fields of one decoded `InstructorCreated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorEvent {
    /// Id assigned by the contract.
    pub id: U256,
    /// Instructor name.
    pub name: String,
    /// Instructor age.
    pub age: U256,
}

/// Name and age stored for one instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorProfile {
    pub name: String,
    pub age: U256,
}

/// ABI-encodes a `setInfo(name, age)` call.
#[must_use]
pub fn encode_set_info(name: &str, age: u64) -> Bytes {
    setInfoCall {
        name: name.to_string(),
        age: U256::from(age),
    }
    .abi_encode()
    .into()
}

// ============================================================================
// Views
// ============================================================================

#[must_use]
pub fn encode_get_person_by_id(id: U256) -> Bytes {
    getPersonByIdCall { id }.abi_encode().into()
}

#[must_use]
pub fn encode_get_latest_person() -> Bytes {
    getLatestPersonCall {}.abi_encode().into()
}

#[must_use]
pub fn encode_get_person_count() -> Bytes {
    getPersonCountCall {}.abi_encode().into()
}

/// Decodes the return data of `getPersonById`.
///
/// # Errors
///
/// Returns `DashError::Decode` if the data is not a `(string, uint256)`.
pub fn decode_person_by_id(data: &[u8]) -> Result<InstructorProfile, DashError> {
    let person = getPersonByIdCall::abi_decode_returns(data)
        .map_err(|e| DashError::Decode(format!("bad getPersonById result: {e}")))?;
    Ok(InstructorProfile {
        name: person.name,
        age: person.age,
    })
}

/// Decodes the return data of `getLatestPerson`.
///
/// # Errors
///
/// Returns `DashError::Decode` if the data is not a `(string, uint256)`.
pub fn decode_latest_person(data: &[u8]) -> Result<InstructorProfile, DashError> {
    let person = getLatestPersonCall::abi_decode_returns(data)
        .map_err(|e| DashError::Decode(format!("bad getLatestPerson result: {e}")))?;
    Ok(InstructorProfile {
        name: person.name,
        age: person.age,
    })
}

/// Decodes the return data of `getPersonCount`.
///
/// # Errors
///
/// Returns `DashError::Decode` if the data is not a `uint256`.
pub fn decode_person_count(data: &[u8]) -> Result<U256, DashError> {
    getPersonCountCall::abi_decode_returns(data)
        .map_err(|e| DashError::Decode(format!("bad getPersonCount result: {e}")))
}

// ============================================================================
// Events
// ============================================================================

/// Decodes one log as `InstructorCreated`.
///
/// # Errors
///
/// Returns `DashError::Decode` if the log has a different signature or a
/// malformed payload.
pub fn decode_instructor_created(log: &RpcLog) -> Result<InstructorEvent, DashError> {
    let raw = Log::new(log.address, log.topics.clone(), log.data.clone())
        .ok_or_else(|| DashError::Decode("log has too many topics".to_string()))?;

    let decoded = InstructorCreated::decode_log(&raw)
        .map_err(|e| DashError::Decode(format!("not an InstructorCreated log: {e}")))?;

    Ok(InstructorEvent {
        id: decoded.data.id,
        name: decoded.data.name,
        age: decoded.data.age,
    })
}

/// Decodes every `InstructorCreated` event in a receipt, skipping logs that
/// do not decode.
#[must_use]
pub fn decode_instructor_events(logs: &[RpcLog]) -> Vec<InstructorEvent> {
    logs.iter()
        .filter_map(|log| {
            decode_instructor_created(log)
                .inspect_err(|e| tracing::debug!("Skipping receipt log: {e}"))
                .ok()
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::LogMother;

    #[test]
    fn test_encode_set_info_selector() {
        let data = encode_set_info("Alice", 30);
        assert_eq!(&data[..4], setInfoCall::SELECTOR.as_slice());
        let decoded = setInfoCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.name, "Alice");
        assert_eq!(decoded.age, U256::from(30u64));
    }

    #[test]
    fn test_decode_instructor_created() {
        let log = LogMother::instructor_created(7, "Alice", 30);
        let event = decode_instructor_created(&log).unwrap();
        assert_eq!(event.id, U256::from(7u64));
        assert_eq!(event.name, "Alice");
        assert_eq!(event.age, U256::from(30u64));
    }

    #[test]
    fn test_decode_rejects_other_events() {
        let log = LogMother::unrelated();
        assert!(matches!(
            decode_instructor_created(&log),
            Err(DashError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_events_skips_bad_logs() {
        let logs = vec![
            LogMother::unrelated(),
            LogMother::instructor_created(1, "Bob", 41),
            LogMother::truncated_instructor_created(),
        ];
        let events = decode_instructor_events(&logs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Bob");
    }

    #[test]
    fn test_view_selectors() {
        let by_id = encode_get_person_by_id(U256::from(7u64));
        assert_eq!(&by_id[..4], getPersonByIdCall::SELECTOR.as_slice());
        assert_eq!(by_id.len(), 4 + 32);
        assert_eq!(
            encode_get_latest_person().as_ref(),
            getLatestPersonCall::SELECTOR.as_slice()
        );
        assert_eq!(
            encode_get_person_count().as_ref(),
            getPersonCountCall::SELECTOR.as_slice()
        );
    }

    #[test]
    fn test_decode_person() {
        let data = getPersonByIdCall::abi_encode_returns(&getPersonByIdReturn {
            name: "Ada".to_string(),
            age: U256::from(36u64),
        });
        let expected = InstructorProfile {
            name: "Ada".to_string(),
            age: U256::from(36u64),
        };
        assert_eq!(decode_person_by_id(&data).unwrap(), expected);
        assert_eq!(decode_latest_person(&data).unwrap(), expected);
    }

    #[test]
    fn test_decode_person_count() {
        let data = getPersonCountCall::abi_encode_returns(&U256::from(12u64));
        assert_eq!(decode_person_count(&data).unwrap(), U256::from(12u64));
    }

    #[test]
    fn test_empty_return_data_is_decode_error() {
        assert!(matches!(decode_person_by_id(&[]), Err(DashError::Decode(_))));
        assert!(matches!(decode_person_count(&[]), Err(DashError::Decode(_))));
    }
}

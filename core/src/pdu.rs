//! The request/response shape a [`crate::device::DeviceActor`] answers.
//!
//! This is deliberately not a real SNMP PDU: spec.md names the "SNMP PDU
//! codec" as an external collaborator the core never needs to know
//! about. `devsim-agent` converts between real BER-encoded PDUs and
//! these plain OID-keyed structs.

use crate::behavior::TypedValue;

/// The SNMP operation a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduOperation {
    Get,
    GetNext,
}

/// A query against a device, opaque to anything outside the actor that
/// answers it.
#[derive(Debug, Clone)]
pub struct SnmpRequest {
    pub operation: PduOperation,
    pub oids: Vec<String>,
}

impl SnmpRequest {
    pub fn get(oids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            operation: PduOperation::Get,
            oids: oids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get_next(oids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            operation: PduOperation::GetNext,
            oids: oids.into_iter().map(Into::into).collect(),
        }
    }
}

/// A device's answer to a [`SnmpRequest`]. `None` for a binding means
/// "no such object" at that OID (GET) or "end of MIB view" (GETNEXT).
#[derive(Debug, Clone, Default)]
pub struct SnmpResponse {
    pub bindings: Vec<(String, Option<TypedValue>)>,
}

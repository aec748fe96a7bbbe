//! SNMP PDU codec: BER encode/decode via `rasn`/`rasn-snmp`/`rasn-smi`,
//! converting to and from `devsim_core`'s opaque [`SnmpRequest`]/
//! [`SnmpResponse`]. Modeled on `zenoh-bridge-snmp::trap`'s
//! `rasn::ber::decode`/`encode` usage and its `ObjectSyntax` match arms,
//! generalized from "decode an inbound trap" to "decode an inbound
//! request and encode an outbound response."
//!
//! SNMPv1/v2c GET and GETNEXT only (spec.md's non-goal: "a real SNMP
//! agent... not conformance"). GETBULK and SNMPv3/USM are out of scope.

use anyhow::{Context, Result, anyhow, bail};
use rasn_smi::v1 as smi_v1;
use rasn_smi::v2 as smi_v2;
use rasn_snmp::v1;
use rasn_snmp::v2;
use rasn_snmp::v2c;

use devsim_core::{PduOperation, SnmpRequest, SnmpResponse, TypedValue};

/// SNMP protocol version carried by a decoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V1,
    V2c,
}

/// A decoded inbound message: version, community, and the opaque
/// request the pool/actor will answer.
pub struct DecodedMessage {
    pub version: Version,
    pub community: Vec<u8>,
    pub request_id: i64,
    pub request: SnmpRequest,
}

/// Decode a raw UDP datagram into a [`DecodedMessage`].
pub fn decode_request(data: &[u8]) -> Result<DecodedMessage> {
    if let Ok(msg) = rasn::ber::decode::<v1::Message<v1::Pdus>>(data) {
        return decode_v1(msg);
    }
    if let Ok(msg) = rasn::ber::decode::<v2c::Message<v2::Pdus>>(data) {
        return decode_v2c(msg);
    }
    bail!("failed to decode SNMP message: unsupported version or corrupt data")
}

fn decode_v1(msg: v1::Message<v1::Pdus>) -> Result<DecodedMessage> {
    let community = msg.community.to_vec();
    let (operation, request_id, oids) = match msg.data {
        v1::Pdus::GetRequest(pdu) => {
            let oids = oids_from_v1(&pdu.0);
            (PduOperation::Get, pdu.0.request_id, oids)
        }
        v1::Pdus::GetNextRequest(pdu) => {
            let oids = oids_from_v1(&pdu.0);
            (PduOperation::GetNext, pdu.0.request_id, oids)
        }
        _ => bail!("unsupported SNMPv1 PDU type for a request"),
    };

    Ok(DecodedMessage {
        version: Version::V1,
        community,
        request_id: i64::try_from(&request_id).unwrap_or(0),
        request: SnmpRequest { operation, oids },
    })
}

fn decode_v2c(msg: v2c::Message<v2::Pdus>) -> Result<DecodedMessage> {
    let community = msg.community.to_vec();
    let (operation, request_id, oids) = match msg.data {
        v2::Pdus::GetRequest(pdu) => (PduOperation::Get, pdu.0.request_id, oids_from_v2(&pdu.0)),
        v2::Pdus::GetNextRequest(pdu) => {
            (PduOperation::GetNext, pdu.0.request_id, oids_from_v2(&pdu.0))
        }
        _ => bail!("unsupported SNMPv2c PDU type for a request"),
    };

    Ok(DecodedMessage {
        version: Version::V2c,
        community,
        request_id: i64::from(request_id),
        request: SnmpRequest { operation, oids },
    })
}

fn oids_from_v1(pdu: &v1::Pdu) -> Vec<String> {
    pdu.variable_bindings
        .iter()
        .map(|vb| oid_to_string(&vb.name))
        .collect()
}

fn oids_from_v2(pdu: &v2::Pdu) -> Vec<String> {
    pdu.variable_bindings
        .iter()
        .map(|vb| oid_to_string(&vb.name))
        .collect()
}

/// Encode a [`SnmpResponse`] as a BER reply message matching the
/// request's version, community, and request ID.
pub fn encode_response(
    version: Version,
    community: &[u8],
    request_id: i64,
    response: &SnmpResponse,
) -> Result<Vec<u8>> {
    match version {
        Version::V1 => encode_v1_response(community, request_id, response),
        Version::V2c => encode_v2c_response(community, request_id, response),
    }
}

fn encode_v1_response(community: &[u8], request_id: i64, response: &SnmpResponse) -> Result<Vec<u8>> {
    let mut bindings = v1::VarBindList::new();
    for (oid, value) in &response.bindings {
        let oid = parse_oid(oid)?;
        let syntax = match value {
            Some(v) => typed_value_to_v1_syntax(v),
            None => smi_v1::ObjectSyntax::Simple(smi_v1::SimpleSyntax::Empty),
        };
        bindings.push(v1::VarBind {
            name: oid,
            value: syntax,
        });
    }

    let pdu = v1::Pdu {
        request_id: request_id.into(),
        error_status: 0u32.into(),
        error_index: 0u32.into(),
        variable_bindings: bindings,
    };

    let msg = v1::Message {
        version: 0.into(),
        community: community.to_vec().into(),
        data: v1::Pdus::GetResponse(v1::GetResponse(pdu)),
    };

    rasn::ber::encode(&msg).context("failed to encode SNMPv1 response")
}

fn encode_v2c_response(
    community: &[u8],
    request_id: i64,
    response: &SnmpResponse,
) -> Result<Vec<u8>> {
    let mut bindings = v2::VarBindList::new();
    for (oid, value) in &response.bindings {
        let oid = parse_oid(oid)?;
        let binding_value = match value {
            Some(v) => v2::VarBindValue::Value(typed_value_to_v2_syntax(v)),
            None => v2::VarBindValue::NoSuchObject,
        };
        bindings.push(v2::VarBind {
            name: oid,
            value: binding_value,
        });
    }

    let pdu = v2::Pdu {
        request_id: i32::try_from(request_id).unwrap_or(0),
        error_status: 0u32.into(),
        error_index: 0u32.into(),
        variable_bindings: bindings,
    };

    let msg = v2c::Message {
        version: 1.into(),
        community: community.to_vec().into(),
        data: v2::Pdus::Response(v2::Response(pdu)),
    };

    rasn::ber::encode(&msg).context("failed to encode SNMPv2c response")
}

fn typed_value_to_v1_syntax(value: &TypedValue) -> smi_v1::ObjectSyntax {
    use smi_v1::{ApplicationSyntax, Counter, Gauge, ObjectSyntax, SimpleSyntax, TimeTicks};

    match value {
        TypedValue::Counter32(v) => ObjectSyntax::ApplicationWide(ApplicationSyntax::Counter(Counter(*v))),
        TypedValue::Gauge32(v) => ObjectSyntax::ApplicationWide(ApplicationSyntax::Gauge(Gauge(*v as u32))),
        TypedValue::Timeticks(v) => {
            ObjectSyntax::ApplicationWide(ApplicationSyntax::Ticks(TimeTicks(*v)))
        }
        TypedValue::Integer(v) => ObjectSyntax::Simple(SimpleSyntax::Number((*v).into())),
        TypedValue::String(bytes) => {
            ObjectSyntax::Simple(SimpleSyntax::String(bytes.clone().into()))
        }
        TypedValue::Opaque(bytes) => {
            ObjectSyntax::ApplicationWide(ApplicationSyntax::Arbitrary(bytes.clone().into()))
        }
    }
}

fn typed_value_to_v2_syntax(value: &TypedValue) -> smi_v2::ObjectSyntax {
    use smi_v2::{ApplicationSyntax, ObjectSyntax, SimpleSyntax};

    match value {
        TypedValue::Counter32(v) => {
            ObjectSyntax::ApplicationWide(ApplicationSyntax::Counter(smi_v1::Counter(*v)))
        }
        TypedValue::Gauge32(v) => {
            ObjectSyntax::ApplicationWide(ApplicationSyntax::Unsigned(smi_v1::Gauge(*v as u32)))
        }
        TypedValue::Timeticks(v) => {
            ObjectSyntax::ApplicationWide(ApplicationSyntax::Ticks(smi_v1::TimeTicks(*v)))
        }
        TypedValue::Integer(v) => ObjectSyntax::Simple(SimpleSyntax::Integer((*v).into())),
        TypedValue::String(bytes) => {
            ObjectSyntax::Simple(SimpleSyntax::String(bytes.clone().into()))
        }
        TypedValue::Opaque(bytes) => {
            ObjectSyntax::ApplicationWide(ApplicationSyntax::Arbitrary(bytes.clone().into()))
        }
    }
}

fn parse_oid(oid_str: &str) -> Result<rasn::types::ObjectIdentifier> {
    let arcs: Result<Vec<u32>, _> = oid_str.split('.').map(str::parse::<u32>).collect();
    let arcs = arcs.map_err(|_| anyhow!("invalid OID '{oid_str}'"))?;
    if arcs.len() < 2 {
        bail!("invalid OID '{oid_str}': need at least two arcs");
    }
    Ok(rasn::types::ObjectIdentifier::new_unchecked(arcs.into()))
}

fn oid_to_string(oid: &rasn::types::ObjectIdentifier) -> String {
    oid.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(".")
}

//! Standard test fixtures with realistic MIB data.

use tiny_snmp::{Oid, OidTable, Value, oid};

/// Community every test agent accepts.
pub const COMMUNITY: &[u8] = b"public";

/// SNMPv1 GetRequest, community "public", request-id 1, OID 1.3, NULL value.
pub const SCENARIO_GET: [u8; 31] = [
    0x30, 0x19, 0x02, 0x01, 0x00, 0x04, 0x06, 0x70, 0x75, 0x62, 0x6C, 0x69, 0x63, 0xA0, 0x0C,
    0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05,
    0x00,
];

/// Standard system MIB entries (1.3.6.1.2.1.1).
///
/// sysDescr, sysUpTime and sysServices are read-only; sysContact, sysName
/// and sysLocation are writable.
pub fn system_mib() -> OidTable {
    OidTable::new()
        .with(sys_descr(), Value::from("Test SNMP Agent"))
        .with(sys_uptime(), Value::Integer(123456))
        .with_writable(sys_contact(), Value::from("admin@test.local"))
        .with_writable(sys_name(), Value::from("test-agent"))
        .with_writable(sys_location(), Value::from("Test Lab"))
        .with(sys_services(), Value::Integer(72))
}

/// system (1.3.6.1.2.1.1)
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// sysDescr.0
pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}

/// sysUpTime.0
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}

/// sysContact.0
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}

/// sysName.0
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

/// sysLocation.0
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// sysServices.0
pub fn sys_services() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)
}

/// An OID inside the system subtree that has no object.
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 99, 0)
}

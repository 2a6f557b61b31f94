//! Broadcast-standard specific tuning identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized service identity used to match a grabbed channel against the
/// stored tuning details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TuningKey {
    pub network_id: u16,
    pub transport_id: u16,
    pub service_id: u16,
}

impl TuningKey {
    pub fn new(network_id: u16, transport_id: u16, service_id: u16) -> Self {
        Self {
            network_id,
            transport_id,
            service_id,
        }
    }
}

impl fmt::Display for TuningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "networkid:0x{:X} transportid:0x{:X} serviceid:0x{:X}",
            self.network_id, self.transport_id, self.service_id
        )
    }
}

/// The channel a listing was grabbed from, as described by the tuner.
///
/// Physical parameters are informational only; matching always goes through
/// [`BroadcastChannel::tuning_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "standard", rename_all = "kebab-case")]
pub enum BroadcastChannel {
    /// DVB-C cable.
    DvbC {
        network_id: u16,
        transport_id: u16,
        service_id: u16,
        #[serde(default)]
        frequency_khz: Option<u32>,
        #[serde(default)]
        symbol_rate: Option<u32>,
    },
    /// DVB-S / DVB-S2 satellite.
    DvbS {
        network_id: u16,
        transport_id: u16,
        service_id: u16,
        #[serde(default)]
        frequency_khz: Option<u32>,
        #[serde(default)]
        symbol_rate: Option<u32>,
    },
    /// DVB-T / DVB-T2 terrestrial.
    DvbT {
        network_id: u16,
        transport_id: u16,
        service_id: u16,
        #[serde(default)]
        frequency_khz: Option<u32>,
        #[serde(default)]
        bandwidth_khz: Option<u32>,
    },
    /// ATSC. There is no original network id; the program number identifies
    /// the service within the transport stream.
    Atsc {
        transport_id: u16,
        program_number: u16,
        #[serde(default)]
        major_channel: Option<u16>,
        #[serde(default)]
        minor_channel: Option<u16>,
    },
    /// ISDB-T / ISDB-S (NID/TSID/SID).
    Isdb { nid: u16, tsid: u16, sid: u16 },
}

impl BroadcastChannel {
    /// Create an ISDB channel from its NID/TSID/SID triple.
    pub fn isdb(nid: u16, tsid: u16, sid: u16) -> Self {
        BroadcastChannel::Isdb { nid, tsid, sid }
    }

    /// Create a DVB-T channel without physical parameters.
    pub fn dvb_t(network_id: u16, transport_id: u16, service_id: u16) -> Self {
        BroadcastChannel::DvbT {
            network_id,
            transport_id,
            service_id,
            frequency_khz: None,
            bandwidth_khz: None,
        }
    }

    /// Normalize to the identity stored in the tuning details table.
    pub fn tuning_key(&self) -> TuningKey {
        match *self {
            BroadcastChannel::DvbC {
                network_id,
                transport_id,
                service_id,
                ..
            }
            | BroadcastChannel::DvbS {
                network_id,
                transport_id,
                service_id,
                ..
            }
            | BroadcastChannel::DvbT {
                network_id,
                transport_id,
                service_id,
                ..
            } => TuningKey::new(network_id, transport_id, service_id),
            BroadcastChannel::Atsc {
                transport_id,
                program_number,
                ..
            } => TuningKey::new(0, transport_id, program_number),
            BroadcastChannel::Isdb { nid, tsid, sid } => TuningKey::new(nid, tsid, sid),
        }
    }

    /// Short name of the broadcast standard, as stored with tuning details.
    pub fn standard_name(&self) -> &'static str {
        match self {
            BroadcastChannel::DvbC { .. } => "dvb-c",
            BroadcastChannel::DvbS { .. } => "dvb-s",
            BroadcastChannel::DvbT { .. } => "dvb-t",
            BroadcastChannel::Atsc { .. } => "atsc",
            BroadcastChannel::Isdb { .. } => "isdb",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_key_per_standard() {
        let dvbc = BroadcastChannel::DvbC {
            network_id: 1,
            transport_id: 2,
            service_id: 3,
            frequency_khz: Some(346_000),
            symbol_rate: Some(6900),
        };
        assert_eq!(dvbc.tuning_key(), TuningKey::new(1, 2, 3));

        let atsc = BroadcastChannel::Atsc {
            transport_id: 0x0815,
            program_number: 3,
            major_channel: Some(7),
            minor_channel: Some(1),
        };
        assert_eq!(atsc.tuning_key(), TuningKey::new(0, 0x0815, 3));

        let isdb = BroadcastChannel::isdb(0x7FE8, 0x7FE8, 1024);
        assert_eq!(isdb.tuning_key(), TuningKey::new(0x7FE8, 0x7FE8, 1024));
    }

    #[test]
    fn test_tuning_key_display_is_hex() {
        let key = TuningKey::new(0x7FE8, 32736, 1024);
        assert_eq!(
            key.to_string(),
            "networkid:0x7FE8 transportid:0x7FE0 serviceid:0x400"
        );
    }

    #[test]
    fn test_channel_json_tagged_by_standard() {
        let json = r#"{"standard":"dvb-t","network_id":8468,"transport_id":4100,"service_id":4164}"#;
        let channel: BroadcastChannel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.standard_name(), "dvb-t");
        assert_eq!(channel.tuning_key(), TuningKey::new(8468, 4100, 4164));
    }
}

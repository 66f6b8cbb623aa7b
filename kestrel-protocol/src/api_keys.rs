use bytes::{Buf, BufMut};
use num_derive::{FromPrimitive, ToPrimitive};

use crate::codec::{Decodable, Encodable};
use crate::error::{DecodeError, EncodeError};
use crate::schema::{Schema, WireSchema};

/// Numeric identifier of a broker API, sent as an Int16 in every request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Default)]
#[repr(i16)]
pub enum ApiKey {
    #[default]
    Produce = 0,
    Fetch = 1,
    ListOffsets = 2,
    Metadata = 3,
    LeaderAndIsr = 4,
    StopReplica = 5,
    UpdateMetadata = 6,
    ControlledShutdown = 7,
    OffsetCommit = 8,
    OffsetFetch = 9,
    FindCoordinator = 10,
    JoinGroup = 11,
    Heartbeat = 12,
    LeaveGroup = 13,
    SyncGroup = 14,
    DescribeGroups = 15,
    ListGroups = 16,
    SaslHandshake = 17,
    ApiVersions = 18,
    CreateTopics = 19,
    DeleteTopics = 20,
    DeleteRecords = 21,
    InitProducerId = 22,
    OffsetForLeaderEpoch = 23,
    AddPartitionsToTxn = 24,
    AddOffsetsToTxn = 25,
    EndTxn = 26,
    WriteTxnMarkers = 27,
    TxnOffsetCommit = 28,
    DescribeAcls = 29,
    CreateAcls = 30,
    DeleteAcls = 31,
    DescribeConfigs = 32,
    AlterConfigs = 33,
    AlterReplicaLogDirs = 34,
    DescribeLogDirs = 35,
    SaslAuthenticate = 36,
    CreatePartitions = 37,
}

impl Encodable for ApiKey {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        (*self as i16).encode(buf)
    }

    fn encoded_len(&self) -> usize {
        2
    }
}

impl Decodable for ApiKey {
    fn decode(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let key = i16::decode(buf)?;
        num_traits::FromPrimitive::from_i16(key).ok_or(DecodeError::UnknownApiKey(key))
    }
}

impl WireSchema for ApiKey {
    fn schema() -> Schema {
        Schema::Int16
    }
}

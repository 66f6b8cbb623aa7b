//! Broker-reported error codes

use std::fmt;

/// Error codes a broker embeds in response bodies.
///
/// These are data, not local failures: responses keep the raw `i16` and
/// callers look the value up here when they want a name for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The server experienced an unexpected error when processing the request
    UnknownServerError = -1,
    /// No error
    None = 0,
    /// The requested offset is not within the range of offsets maintained by the server
    OffsetOutOfRange = 1,
    /// This message has failed its CRC checksum, exceeds the valid size, or is otherwise corrupt
    CorruptMessage = 2,
    /// This server does not host this topic-partition
    UnknownTopicOrPartition = 3,
    /// The requested fetch size is invalid
    InvalidFetchSize = 4,
    /// There is no leader for this topic-partition as we are in the middle of a leadership election
    LeaderNotAvailable = 5,
    /// This server is not the leader for that topic-partition
    NotLeaderForPartition = 6,
    /// The request timed out
    RequestTimedOut = 7,
    /// The broker is not available
    BrokerNotAvailable = 8,
    /// The replica is not available for the requested topic-partition
    ReplicaNotAvailable = 9,
    /// The request included a message larger than the max message size the server will accept
    MessageTooLarge = 10,
    /// The controller moved to another broker
    StaleControllerEpoch = 11,
    /// The metadata field of the offset request was too large
    OffsetMetadataTooLarge = 12,
    /// The server disconnected before a response was received
    NetworkException = 13,
    /// The coordinator is loading and hence can't process requests
    CoordinatorLoadInProgress = 14,
    /// The coordinator is not available
    CoordinatorNotAvailable = 15,
    /// This is not the correct coordinator
    NotCoordinator = 16,
    /// The request attempted to perform an operation on an invalid topic
    InvalidTopicException = 17,
    /// The request included message batch larger than the configured segment size on the server
    RecordListTooLarge = 18,
    /// Messages are rejected since there are fewer in-sync replicas than required
    NotEnoughReplicas = 19,
    /// Messages are written to the log, but to fewer in-sync replicas than required
    NotEnoughReplicasAfterAppend = 20,
    /// Produce request specified an invalid value for required acks
    InvalidRequiredAcks = 21,
    /// Specified group generation id is not valid
    IllegalGeneration = 22,
    /// The group member's supported protocols are incompatible with those of existing members
    InconsistentGroupProtocol = 23,
    /// The configured groupId is invalid
    InvalidGroupId = 24,
    /// The coordinator is not aware of this member
    UnknownMemberId = 25,
    /// The session timeout is not within the range allowed by the broker
    InvalidSessionTimeout = 26,
    /// The group is rebalancing, so a rejoin is needed
    RebalanceInProgress = 27,
    /// The committing offset data size is not valid
    InvalidCommitOffsetSize = 28,
    /// Topic authorization failed
    TopicAuthorizationFailed = 29,
    /// Group authorization failed
    GroupAuthorizationFailed = 30,
    /// Cluster authorization failed
    ClusterAuthorizationFailed = 31,
    /// The timestamp of the message is out of acceptable range
    InvalidTimestamp = 32,
    /// The broker does not support the requested SASL mechanism
    UnsupportedSaslMechanism = 33,
    /// Request is not valid given the current SASL state
    IllegalSaslState = 34,
    /// The version of API is not supported
    UnsupportedVersion = 35,
    /// Topic with this name already exists
    TopicAlreadyExists = 36,
    /// Number of partitions is below 1
    InvalidPartitions = 37,
    /// Replication factor is below 1 or larger than the number of available brokers
    InvalidReplicationFactor = 38,
    /// Replica assignment is invalid
    InvalidReplicaAssignment = 39,
    /// Configuration is invalid
    InvalidConfig = 40,
    /// This is not the correct controller for this cluster
    NotController = 41,
    /// This most likely occurs because of a request being malformed by the client library
    InvalidRequest = 42,
    /// The message format version on the broker does not support the request
    UnsupportedForMessageFormat = 43,
    /// Request parameters do not satisfy the configured policy
    PolicyViolation = 44,
}

impl ErrorCode {
    /// Convert an i16 to an ErrorCode
    pub fn from_i16(code: i16) -> Option<Self> {
        match code {
            -1 => Some(ErrorCode::UnknownServerError),
            0 => Some(ErrorCode::None),
            1 => Some(ErrorCode::OffsetOutOfRange),
            2 => Some(ErrorCode::CorruptMessage),
            3 => Some(ErrorCode::UnknownTopicOrPartition),
            4 => Some(ErrorCode::InvalidFetchSize),
            5 => Some(ErrorCode::LeaderNotAvailable),
            6 => Some(ErrorCode::NotLeaderForPartition),
            7 => Some(ErrorCode::RequestTimedOut),
            8 => Some(ErrorCode::BrokerNotAvailable),
            9 => Some(ErrorCode::ReplicaNotAvailable),
            10 => Some(ErrorCode::MessageTooLarge),
            11 => Some(ErrorCode::StaleControllerEpoch),
            12 => Some(ErrorCode::OffsetMetadataTooLarge),
            13 => Some(ErrorCode::NetworkException),
            14 => Some(ErrorCode::CoordinatorLoadInProgress),
            15 => Some(ErrorCode::CoordinatorNotAvailable),
            16 => Some(ErrorCode::NotCoordinator),
            17 => Some(ErrorCode::InvalidTopicException),
            18 => Some(ErrorCode::RecordListTooLarge),
            19 => Some(ErrorCode::NotEnoughReplicas),
            20 => Some(ErrorCode::NotEnoughReplicasAfterAppend),
            21 => Some(ErrorCode::InvalidRequiredAcks),
            22 => Some(ErrorCode::IllegalGeneration),
            23 => Some(ErrorCode::InconsistentGroupProtocol),
            24 => Some(ErrorCode::InvalidGroupId),
            25 => Some(ErrorCode::UnknownMemberId),
            26 => Some(ErrorCode::InvalidSessionTimeout),
            27 => Some(ErrorCode::RebalanceInProgress),
            28 => Some(ErrorCode::InvalidCommitOffsetSize),
            29 => Some(ErrorCode::TopicAuthorizationFailed),
            30 => Some(ErrorCode::GroupAuthorizationFailed),
            31 => Some(ErrorCode::ClusterAuthorizationFailed),
            32 => Some(ErrorCode::InvalidTimestamp),
            33 => Some(ErrorCode::UnsupportedSaslMechanism),
            34 => Some(ErrorCode::IllegalSaslState),
            35 => Some(ErrorCode::UnsupportedVersion),
            36 => Some(ErrorCode::TopicAlreadyExists),
            37 => Some(ErrorCode::InvalidPartitions),
            38 => Some(ErrorCode::InvalidReplicationFactor),
            39 => Some(ErrorCode::InvalidReplicaAssignment),
            40 => Some(ErrorCode::InvalidConfig),
            41 => Some(ErrorCode::NotController),
            42 => Some(ErrorCode::InvalidRequest),
            43 => Some(ErrorCode::UnsupportedForMessageFormat),
            44 => Some(ErrorCode::PolicyViolation),
            _ => None,
        }
    }

    /// Convert an ErrorCode to an i16
    pub fn to_i16(&self) -> i16 {
        *self as i16
    }

    /// Whether this code reports success
    pub fn is_ok(&self) -> bool {
        *self == ErrorCode::None
    }
}

impl std::error::Error for ErrorCode {}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorCode::UnknownServerError => "The server experienced an unexpected error when processing the request",
            ErrorCode::None => "No error",
            ErrorCode::OffsetOutOfRange => "The requested offset is not within the range of offsets maintained by the server",
            ErrorCode::CorruptMessage => "This message has failed its CRC checksum, exceeds the valid size, or is otherwise corrupt",
            ErrorCode::UnknownTopicOrPartition => "This server does not host this topic-partition",
            ErrorCode::InvalidFetchSize => "The requested fetch size is invalid",
            ErrorCode::LeaderNotAvailable => "There is no leader for this topic-partition as we are in the middle of a leadership election",
            ErrorCode::NotLeaderForPartition => "This server is not the leader for that topic-partition",
            ErrorCode::RequestTimedOut => "The request timed out",
            ErrorCode::BrokerNotAvailable => "The broker is not available",
            ErrorCode::ReplicaNotAvailable => "The replica is not available for the requested topic-partition",
            ErrorCode::MessageTooLarge => "The request included a message larger than the max message size the server will accept",
            ErrorCode::StaleControllerEpoch => "The controller moved to another broker",
            ErrorCode::OffsetMetadataTooLarge => "The metadata field of the offset request was too large",
            ErrorCode::NetworkException => "The server disconnected before a response was received",
            ErrorCode::CoordinatorLoadInProgress => "The coordinator is loading and hence can't process requests",
            ErrorCode::CoordinatorNotAvailable => "The coordinator is not available",
            ErrorCode::NotCoordinator => "This is not the correct coordinator",
            ErrorCode::InvalidTopicException => "The request attempted to perform an operation on an invalid topic",
            ErrorCode::RecordListTooLarge => "The request included message batch larger than the configured segment size on the server",
            ErrorCode::NotEnoughReplicas => "Messages are rejected since there are fewer in-sync replicas than required",
            ErrorCode::NotEnoughReplicasAfterAppend => "Messages are written to the log, but to fewer in-sync replicas than required",
            ErrorCode::InvalidRequiredAcks => "Produce request specified an invalid value for required acks",
            ErrorCode::IllegalGeneration => "Specified group generation id is not valid",
            ErrorCode::InconsistentGroupProtocol => "The group member's supported protocols are incompatible with those of existing members",
            ErrorCode::InvalidGroupId => "The configured groupId is invalid",
            ErrorCode::UnknownMemberId => "The coordinator is not aware of this member",
            ErrorCode::InvalidSessionTimeout => "The session timeout is not within the range allowed by the broker",
            ErrorCode::RebalanceInProgress => "The group is rebalancing, so a rejoin is needed",
            ErrorCode::InvalidCommitOffsetSize => "The committing offset data size is not valid",
            ErrorCode::TopicAuthorizationFailed => "Topic authorization failed",
            ErrorCode::GroupAuthorizationFailed => "Group authorization failed",
            ErrorCode::ClusterAuthorizationFailed => "Cluster authorization failed",
            ErrorCode::InvalidTimestamp => "The timestamp of the message is out of acceptable range",
            ErrorCode::UnsupportedSaslMechanism => "The broker does not support the requested SASL mechanism",
            ErrorCode::IllegalSaslState => "Request is not valid given the current SASL state",
            ErrorCode::UnsupportedVersion => "The version of API is not supported",
            ErrorCode::TopicAlreadyExists => "Topic with this name already exists",
            ErrorCode::InvalidPartitions => "Number of partitions is below 1",
            ErrorCode::InvalidReplicationFactor => "Replication factor is below 1 or larger than the number of available brokers",
            ErrorCode::InvalidReplicaAssignment => "Replica assignment is invalid",
            ErrorCode::InvalidConfig => "Configuration is invalid",
            ErrorCode::NotController => "This is not the correct controller for this cluster",
            ErrorCode::InvalidRequest => "This most likely occurs because of a request being malformed by the client library",
            ErrorCode::UnsupportedForMessageFormat => "The message format version on the broker does not support the request",
            ErrorCode::PolicyViolation => "Request parameters do not satisfy the configured policy",
        };
        write!(f, "{}", msg)
    }
}

impl TryFrom<i16> for ErrorCode {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::from_i16(value).ok_or_else(|| format!("Unknown error code: {}", value))
    }
}

impl From<ErrorCode> for i16 {
    fn from(code: ErrorCode) -> Self {
        code as i16
    }
}

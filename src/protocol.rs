//! PEUP intent protocol
//!
//! Typed envelopes exchanged with the search backend, and the codec that
//! builds, validates, encodes and decodes them.

mod codec;
mod error;
mod filters;
mod manifest;
mod request;
mod response;

#[cfg(test)]
mod proptests;

pub use codec::{
    build_search_intent, decode_request, decode_response, decode_response_value, encode_request,
    extract_results, is_ranked, validate_request, IntentTemplate,
};
pub use error::CodecError;
pub use filters::extract_filters;
pub use manifest::{
    AccessInterface, CommunicationDetails, InterfaceType, LicensingInfo, MonetizationInfo,
    MonetizationModel, ReadmeProto, SecurityInfo,
};
pub use request::{
    Action, AuthInfo, IntentRequest, NftAuth, DEFAULT_SCOPE, PROTOCOL_VERSION, QUERY_PARAM,
    RESPONSE_FORMAT_JSON,
};
pub use response::{IntentResponse, Project, ProjectSearchResult, ResponseMetadata, ResponsePayload};

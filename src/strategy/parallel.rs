//! Parallel JSON -> XML
//!
//! Uses Rayon to convert many complete JSON messages at once. Each
//! message is independent, so results are exactly what a sequential
//! `JsonToXml` would emit, in input order.

use crate::config::TranscoderConfig;
use crate::transcode::json_to_xml_string;
use rayon::prelude::*;
use tracing::debug;

/// Convert messages in parallel
///
/// Each slot holds the XML fragment, or `None` if the message was empty
/// or dropped.
pub fn json_to_xml_batch<M>(messages: &[M], config: &TranscoderConfig) -> Vec<Option<String>>
where
    M: AsRef<[u8]> + Sync,
{
    messages
        .par_iter()
        .enumerate()
        .map(|(index, message)| match json_to_xml_string(message.as_ref(), config) {
            Ok(xml) => xml,
            Err(err) => {
                debug!(index, %err, "dropping JSON message");
                None
            }
        })
        .collect()
}

//! Message type URLs for the client messages the relaying core submits.

pub const UPDATE_CLIENT_TYPE_URL: &str = "/ibc.core.client.v1.MsgUpdateClient";

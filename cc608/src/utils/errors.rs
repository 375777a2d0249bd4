#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug)]
pub enum EnvelopeError {
    #[error("'GA94' user data marker not found (skipping entire payload)")]
    MarkerNotFound,

    #[error("insufficient user data after marker: {0} bytes (skipping entire payload)")]
    InsufficientData(usize),

    #[error("invalid user_data_type_code {0:#04X} (skipping entire payload)")]
    InvalidUserDataTypeCode(u8),

    #[error("process_cc_data_flag not set (skipping entire payload)")]
    ProcessCcDataFlagUnset,

    #[error("cc packet array truncated: need {needed} bytes, have {available}")]
    TruncatedPacketArray { needed: usize, available: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum DecoderError {
    #[error("invalid caption track {0} (expected 0-4)")]
    InvalidCaptionTrack(u8),
}

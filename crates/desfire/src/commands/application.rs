//! Application directory commands

use bytes::Bytes;
use desfire_apdu_core::{ApduCommand, Error, Response, Result};

use crate::constants::ins;
use crate::types::{ApplicationId, CreateOutcome, KeySettings, KeySettingsInfo};

/// SELECT APPLICATION
#[derive(Debug, Clone, Copy)]
pub struct SelectApplicationCommand {
    aid: ApplicationId,
}

impl SelectApplicationCommand {
    /// Select `aid`; the zero id selects the PICC
    pub const fn new(aid: ApplicationId) -> Self {
        Self { aid }
    }
}

impl ApduCommand for SelectApplicationCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::SELECT_APPLICATION
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(self.aid.as_bytes()))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// GET APPLICATION IDS
#[derive(Debug, Clone, Copy, Default)]
pub struct GetApplicationIdsCommand;

impl ApduCommand for GetApplicationIdsCommand {
    type Success = Vec<ApplicationId>;

    fn instruction(&self) -> u8 {
        ins::GET_APPLICATION_IDS
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        let payload = response.into_payload()?;
        let groups = payload.chunks_exact(3);
        if !groups.remainder().is_empty() {
            return Err(Error::protocol("application id list is not a multiple of 3 bytes"));
        }
        Ok(groups
            .map(|id| ApplicationId::new([id[0], id[1], id[2]]))
            .collect())
    }
}

/// CREATE APPLICATION
#[derive(Debug, Clone, Copy)]
pub struct CreateApplicationCommand {
    aid: ApplicationId,
    settings: KeySettings,
    key_count: u8,
}

impl CreateApplicationCommand {
    /// Create `aid` with the given key settings and key type/count byte
    pub const fn new(aid: ApplicationId, settings: KeySettings, key_count: u8) -> Self {
        Self {
            aid,
            settings,
            key_count,
        }
    }
}

impl ApduCommand for CreateApplicationCommand {
    type Success = CreateOutcome;

    fn instruction(&self) -> u8 {
        ins::CREATE_APPLICATION
    }

    fn data(&self) -> Option<Bytes> {
        let aid = self.aid.as_bytes();
        Some(Bytes::copy_from_slice(&[
            aid[0],
            aid[1],
            aid[2],
            self.settings.to_byte(),
            self.key_count,
        ]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        super::create_outcome(response)
    }
}

/// DELETE APPLICATION
#[derive(Debug, Clone, Copy)]
pub struct DeleteApplicationCommand {
    aid: ApplicationId,
}

impl DeleteApplicationCommand {
    /// Delete `aid`
    pub const fn new(aid: ApplicationId) -> Self {
        Self { aid }
    }
}

impl ApduCommand for DeleteApplicationCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::DELETE_APPLICATION
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(self.aid.as_bytes()))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// CHANGE KEY SETTINGS
#[derive(Debug, Clone, Copy)]
pub struct ChangeKeySettingsCommand {
    settings: KeySettings,
}

impl ChangeKeySettingsCommand {
    /// Replace the key settings of the selected application
    pub const fn new(settings: KeySettings) -> Self {
        Self { settings }
    }
}

impl ApduCommand for ChangeKeySettingsCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::CHANGE_KEY_SETTINGS
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&[self.settings.to_byte()]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// GET KEY SETTINGS
#[derive(Debug, Clone, Copy, Default)]
pub struct GetKeySettingsCommand;

impl ApduCommand for GetKeySettingsCommand {
    type Success = KeySettingsInfo;

    fn instruction(&self) -> u8 {
        ins::GET_KEY_SETTINGS
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        let payload = response.into_exact_payload(2)?;
        Ok(KeySettingsInfo {
            settings: KeySettings::new(payload[0]),
            max_keys: payload[1] & 0x0F,
        })
    }
}

/// GET KEY VERSION
#[derive(Debug, Clone, Copy)]
pub struct GetKeyVersionCommand {
    key_no: u8,
}

impl GetKeyVersionCommand {
    /// Query the version of key slot `key_no`
    pub const fn new(key_no: u8) -> Self {
        Self { key_no }
    }
}

impl ApduCommand for GetKeyVersionCommand {
    type Success = u8;

    fn instruction(&self) -> u8 {
        ins::GET_KEY_VERSION
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&[self.key_no]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        Ok(response.into_exact_payload(1)?[0])
    }
}

//! Application directory operations

use desfire_apdu_core::CardTransport;
use tracing::{debug, info};

use crate::Desfire;
use crate::commands::{
    ChangeKeySettingsCommand, CreateApplicationCommand, DeleteApplicationCommand,
    FreeMemoryCommand, GetApplicationIdsCommand, GetKeySettingsCommand, GetKeyVersionCommand,
};
use crate::constants::{MAX_KEY_NO, MAX_KEYS};
use crate::types::{ApplicationId, CreateOutcome, KeySettings, KeySettingsInfo};
use crate::{Error, Result};

impl<T: CardTransport> Desfire<T> {
    /// List application ids in the order the card reports them
    pub fn application_ids(&mut self) -> Result<Vec<ApplicationId>> {
        let ids = self.execute(&GetApplicationIdsCommand)?;
        debug!(count = ids.len(), "Listed applications");
        Ok(ids)
    }

    /// Create an application with `key_count` DES keys
    ///
    /// An existing application with the same id yields
    /// [`CreateOutcome::AlreadyExists`] rather than an error.
    pub fn create_application(
        &mut self,
        aid: ApplicationId,
        settings: KeySettings,
        key_count: u8,
    ) -> Result<CreateOutcome> {
        if aid.is_picc() {
            return Err(Error::InvalidArgument("the PICC id cannot be created"));
        }
        if key_count == 0 || key_count > MAX_KEYS {
            return Err(Error::InvalidArgument("key count must be 1 to 14"));
        }

        let outcome = self.execute(&CreateApplicationCommand::new(aid, settings, key_count))?;
        info!(%aid, ?outcome, "Create application");
        Ok(outcome)
    }

    /// Delete an application and all its files
    pub fn delete_application(&mut self, aid: ApplicationId) -> Result<()> {
        self.execute(&DeleteApplicationCommand::new(aid))?;
        self.state_mut().on_application_deleted(aid);
        info!(%aid, "Deleted application");
        Ok(())
    }

    /// Replace the key settings of the selected application (or PICC)
    pub fn change_key_settings(&mut self, settings: KeySettings) -> Result<()> {
        self.execute(&ChangeKeySettingsCommand::new(settings))
    }

    /// Read the key settings of the selected application (or PICC)
    pub fn get_key_settings(&mut self) -> Result<KeySettingsInfo> {
        self.execute(&GetKeySettingsCommand)
    }

    /// Read the version byte of key slot `key_no`
    pub fn get_key_version(&mut self, key_no: u8) -> Result<u8> {
        if key_no > MAX_KEY_NO {
            return Err(Error::InvalidArgument("key number must be 0 to 13"));
        }
        self.execute(&GetKeyVersionCommand::new(key_no))
    }

    /// Remaining free user memory in bytes
    pub fn free_memory(&mut self) -> Result<u32> {
        self.execute(&FreeMemoryCommand)
    }
}

//! In-memory DESFire EV1 card used by the integration tests
#![allow(dead_code, unreachable_pub, missing_docs)]

use std::collections::{BTreeMap, VecDeque};

use bytes::Bytes;
use desfire_apdu_core::codec::{encode_i32, encode_u24, read_i32, read_u24};
use desfire_apdu_core::{CardTransport, Command, TransportError};
use desfire_ev1::DesKey;
use desfire_ev1::constants::{file_type, ins};
use desfire_ev1::crypto::{Block, ZERO_IV, cbc_decrypt, cbc_encrypt, rotate_left};
use tracing_subscriber::EnvFilter;

const OK: [u8; 2] = [0x91, 0x00];
const MORE: [u8; 2] = [0x91, 0xAF];
const DUPLICATE: [u8; 2] = [0x91, 0xDE];
const ILLEGAL_COMMAND: [u8; 2] = [0x91, 0x1C];
const NO_SUCH_KEY: [u8; 2] = [0x91, 0x40];
const LENGTH_ERROR: [u8; 2] = [0x91, 0x7E];
const PERMISSION_DENIED: [u8; 2] = [0x91, 0x9D];
const PARAMETER_ERROR: [u8; 2] = [0x91, 0x9E];
const APPLICATION_NOT_FOUND: [u8; 2] = [0x91, 0xA0];
const AUTHENTICATION_ERROR: [u8; 2] = [0x91, 0xAE];
const BOUNDARY_ERROR: [u8; 2] = [0x91, 0xBE];
const FILE_NOT_FOUND: [u8; 2] = [0x91, 0xF0];

const PICC: [u8; 3] = [0, 0, 0];
const TOTAL_MEMORY: u32 = 4096;

/// Install a test log subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug)]
struct PendingAuth {
    key_no: u8,
    key: DesKey,
    ek_rnd_b: Block,
    rnd_b: Block,
}

#[derive(Debug)]
enum Body {
    Standard(Vec<u8>),
    Value {
        lower: i32,
        upper: i32,
        value: i32,
        pending: i32,
        limited_credit: bool,
    },
    Record {
        cyclic: bool,
        record_size: usize,
        max_records: usize,
        records: Vec<Vec<u8>>,
        building: Option<Vec<u8>>,
        clear_pending: bool,
    },
}

impl Body {
    fn allocation(&self) -> u32 {
        match self {
            Self::Standard(data) => data.len() as u32,
            Self::Value { .. } => 4,
            Self::Record {
                record_size,
                max_records,
                ..
            } => (record_size * max_records) as u32,
        }
    }

    fn commit(&mut self) {
        match self {
            Self::Standard(_) => {}
            Self::Value { value, pending, .. } => {
                *value += *pending;
                *pending = 0;
            }
            Self::Record {
                cyclic,
                max_records,
                records,
                building,
                clear_pending,
                ..
            } => {
                if std::mem::take(clear_pending) {
                    records.clear();
                }
                if let Some(record) = building.take() {
                    records.push(record);
                    if *cyclic && records.len() > *max_records {
                        records.remove(0);
                    }
                }
            }
        }
    }

    fn abort(&mut self) {
        match self {
            Self::Standard(_) => {}
            Self::Value { pending, .. } => *pending = 0,
            Self::Record {
                building,
                clear_pending,
                ..
            } => {
                *building = None;
                *clear_pending = false;
            }
        }
    }
}

#[derive(Debug)]
struct File {
    comm: u8,
    access: [u8; 2],
    body: Body,
}

#[derive(Debug)]
struct App {
    settings: u8,
    keys: Vec<DesKey>,
    files: BTreeMap<u8, File>,
}

impl App {
    fn new(settings: u8, key_count: u8) -> Self {
        Self {
            settings,
            keys: (0..key_count).map(|_| DesKey::default()).collect(),
            files: BTreeMap::new(),
        }
    }
}

/// Simulated card speaking wrapped DESFire native commands
#[derive(Debug)]
pub struct SimulatedCard {
    apps: BTreeMap<[u8; 3], App>,
    selected: [u8; 3],
    authenticated: Option<u8>,
    pending_auth: Option<PendingAuth>,
    outgoing: VecDeque<Vec<u8>>,
    frame_size: usize,
    rnd_b: Block,
    /// Reply to the final handshake step with the challenge left unrotated
    pub corrupt_auth_reply: bool,
    /// Every command received
    pub log: Vec<Bytes>,
    connected: bool,
}

impl Default for SimulatedCard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCard {
    pub fn new() -> Self {
        let mut apps = BTreeMap::new();
        apps.insert(PICC, App::new(0x0F, 1));
        Self {
            apps,
            selected: PICC,
            authenticated: None,
            pending_auth: None,
            outgoing: VecDeque::new(),
            frame_size: 59,
            rnd_b: [0x13, 0x57, 0x9B, 0xDF, 0x24, 0x68, 0xAC, 0xE0],
            corrupt_auth_reply: false,
            log: Vec::new(),
            connected: true,
        }
    }

    /// Limit response frames to `frame_size` bytes of data
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size.max(1);
        self
    }

    /// Create an application directly on the card, bypassing the driver
    pub fn add_application(&mut self, aid: [u8; 3], settings: u8, key_count: u8) {
        self.apps.insert(aid, App::new(settings, key_count));
    }

    /// Install `key` in slot `key_no` of `aid`
    pub fn set_key(&mut self, aid: [u8; 3], key_no: u8, key: DesKey) {
        if let Some(slot) = self
            .apps
            .get_mut(&aid)
            .and_then(|app| app.keys.get_mut(key_no as usize))
        {
            *slot = key;
        }
    }

    /// Instruction bytes received so far
    pub fn instructions(&self) -> Vec<u8> {
        self.log.iter().map(|c| c[1]).collect()
    }

    /// Number of continuation requests received
    pub fn continuation_requests(&self) -> usize {
        self.instructions()
            .iter()
            .filter(|&&i| i == ins::ADDITIONAL_FRAME)
            .count()
    }

    fn app(&mut self) -> &mut App {
        self.apps
            .get_mut(&self.selected)
            .expect("selected application exists")
    }

    fn file(&mut self, file_id: u8) -> Option<&mut File> {
        self.app().files.get_mut(&file_id)
    }

    fn frame(data: &[u8], status: [u8; 2]) -> Vec<u8> {
        let mut out = data.to_vec();
        out.extend_from_slice(&status);
        out
    }

    /// Split `data` into frames, returning the first and queueing the rest
    fn chained(&mut self, data: &[u8]) -> Vec<u8> {
        let mut frames: VecDeque<Vec<u8>> =
            data.chunks(self.frame_size).map(<[u8]>::to_vec).collect();
        let first = frames.pop_front().unwrap_or_default();
        self.outgoing = frames;
        if self.outgoing.is_empty() {
            Self::frame(&first, OK)
        } else {
            Self::frame(&first, MORE)
        }
    }

    fn next_frame(&mut self) -> Vec<u8> {
        match self.outgoing.pop_front() {
            Some(data) if self.outgoing.is_empty() => Self::frame(&data, OK),
            Some(data) => Self::frame(&data, MORE),
            None => ILLEGAL_COMMAND.to_vec(),
        }
    }

    fn handle(&mut self, command: &Command) -> Vec<u8> {
        let data = command.payload().to_vec();

        if command.ins != ins::ADDITIONAL_FRAME {
            self.outgoing.clear();
            self.pending_auth = None;
        }

        match command.ins {
            ins::ADDITIONAL_FRAME => match self.pending_auth.take() {
                Some(pending) => self.finish_auth(pending, &data),
                None => self.next_frame(),
            },
            ins::AUTHENTICATE_LEGACY | ins::AUTHENTICATE_ISO => self.start_auth(&data),
            ins::GET_VERSION => self.get_version(),
            ins::SELECT_APPLICATION => self.select(&data),
            ins::GET_APPLICATION_IDS => {
                let ids: Vec<u8> = self
                    .apps
                    .keys()
                    .filter(|aid| **aid != PICC)
                    .flatten()
                    .copied()
                    .collect();
                self.chained(&ids)
            }
            ins::CREATE_APPLICATION => self.create_application(&data),
            ins::DELETE_APPLICATION => self.delete_application(&data),
            ins::CHANGE_KEY_SETTINGS => match data.as_slice() {
                [settings] => {
                    self.app().settings = *settings;
                    OK.to_vec()
                }
                _ => LENGTH_ERROR.to_vec(),
            },
            ins::GET_KEY_SETTINGS => {
                let app = self.app();
                Self::frame(&[app.settings, app.keys.len() as u8], OK)
            }
            ins::GET_KEY_VERSION => match data.as_slice() {
                [key_no] if (*key_no as usize) < self.app().keys.len() => Self::frame(&[0], OK),
                [_] => NO_SUCH_KEY.to_vec(),
                _ => LENGTH_ERROR.to_vec(),
            },
            ins::FREE_MEMORY => {
                let used: u32 = self
                    .apps
                    .values()
                    .flat_map(|app| app.files.values())
                    .map(|f| f.body.allocation())
                    .sum();
                Self::frame(&encode_u24(TOTAL_MEMORY - used).unwrap(), OK)
            }
            ins::FORMAT_PICC => {
                if self.selected != PICC || self.authenticated != Some(0) {
                    return AUTHENTICATION_ERROR.to_vec();
                }
                self.apps.retain(|aid, _| *aid == PICC);
                OK.to_vec()
            }
            ins::GET_FILE_IDS => {
                if self.selected == PICC {
                    return PERMISSION_DENIED.to_vec();
                }
                let ids: Vec<u8> = self.app().files.keys().copied().collect();
                Self::frame(&ids, OK)
            }
            ins::GET_FILE_SETTINGS => self.file_settings(&data),
            ins::DELETE_FILE => match data.as_slice() {
                [id] => match self.app().files.remove(id) {
                    Some(_) => OK.to_vec(),
                    None => FILE_NOT_FOUND.to_vec(),
                },
                _ => LENGTH_ERROR.to_vec(),
            },
            ins::CREATE_STD_DATA_FILE
            | ins::CREATE_VALUE_FILE
            | ins::CREATE_LINEAR_RECORD_FILE
            | ins::CREATE_CYCLIC_RECORD_FILE => self.create_file(command.ins, &data),
            ins::WRITE_DATA => self.write_data(&data),
            ins::READ_DATA => self.read_data(&data),
            ins::WRITE_RECORD => self.write_record(&data),
            ins::READ_RECORDS => self.read_records(&data),
            ins::CLEAR_RECORD_FILE => match data.as_slice() {
                [id] => match self.file(*id) {
                    Some(File {
                        body: Body::Record { clear_pending, .. },
                        ..
                    }) => {
                        *clear_pending = true;
                        OK.to_vec()
                    }
                    Some(_) => PERMISSION_DENIED.to_vec(),
                    None => FILE_NOT_FOUND.to_vec(),
                },
                _ => LENGTH_ERROR.to_vec(),
            },
            ins::GET_VALUE => match data.as_slice() {
                [id] => match self.file(*id) {
                    Some(File {
                        body: Body::Value { value, .. },
                        ..
                    }) => Self::frame(&encode_i32(*value), OK),
                    Some(_) => PERMISSION_DENIED.to_vec(),
                    None => FILE_NOT_FOUND.to_vec(),
                },
                _ => LENGTH_ERROR.to_vec(),
            },
            ins::CREDIT | ins::DEBIT | ins::LIMITED_CREDIT => self.change_value(command.ins, &data),
            ins::COMMIT_TRANSACTION => {
                self.app().files.values_mut().for_each(|f| f.body.commit());
                OK.to_vec()
            }
            ins::ABORT_TRANSACTION => {
                self.app().files.values_mut().for_each(|f| f.body.abort());
                OK.to_vec()
            }
            _ => ILLEGAL_COMMAND.to_vec(),
        }
    }

    fn start_auth(&mut self, data: &[u8]) -> Vec<u8> {
        self.authenticated = None;
        let [key_no] = data else {
            return LENGTH_ERROR.to_vec();
        };
        let Some(key) = self.app().keys.get(*key_no as usize).cloned() else {
            return NO_SUCH_KEY.to_vec();
        };

        // Fresh challenge per attempt
        self.rnd_b = rotate_left(&self.rnd_b, 3);
        self.rnd_b[0] ^= 0x5A;
        let rnd_b = self.rnd_b;
        let ek_rnd_b: Block = cbc_encrypt(&key, &ZERO_IV, &rnd_b).try_into().unwrap();

        self.pending_auth = Some(PendingAuth {
            key_no: *key_no,
            key,
            ek_rnd_b,
            rnd_b,
        });
        Self::frame(&ek_rnd_b, MORE)
    }

    fn finish_auth(&mut self, pending: PendingAuth, token: &[u8]) -> Vec<u8> {
        if token.len() != 16 {
            return LENGTH_ERROR.to_vec();
        }
        let plain = cbc_decrypt(&pending.key, &pending.ek_rnd_b, token).unwrap();
        if plain[8..] != rotate_left(&pending.rnd_b, 1) {
            return AUTHENTICATION_ERROR.to_vec();
        }

        let rnd_a: Block = plain[..8].try_into().unwrap();
        let echoed = if self.corrupt_auth_reply {
            rnd_a
        } else {
            rotate_left(&rnd_a, 1)
        };
        let iv: Block = token[8..].try_into().unwrap();
        let reply = cbc_encrypt(&pending.key, &iv, &echoed);

        self.authenticated = Some(pending.key_no);
        Self::frame(&reply, OK)
    }

    fn get_version(&mut self) -> Vec<u8> {
        self.outgoing = VecDeque::from([
            vec![0x04, 0x01, 0x01, 0x01, 0x04, 0x18, 0x05],
            vec![
                0x04, 0x23, 0x6A, 0x82, 0xB1, 0x24, 0x80, 0xBA, 0x34, 0x56, 0x78, 0x90, 0x2C,
                0x13,
            ],
        ]);
        Self::frame(&[0x04, 0x01, 0x01, 0x01, 0x00, 0x18, 0x05], MORE)
    }

    fn select(&mut self, data: &[u8]) -> Vec<u8> {
        let Ok(aid) = <[u8; 3]>::try_from(data) else {
            return LENGTH_ERROR.to_vec();
        };
        self.authenticated = None;
        if !self.apps.contains_key(&aid) {
            return APPLICATION_NOT_FOUND.to_vec();
        }
        // Selecting discards any open transaction
        self.app().files.values_mut().for_each(|f| f.body.abort());
        self.selected = aid;
        OK.to_vec()
    }

    fn create_application(&mut self, data: &[u8]) -> Vec<u8> {
        let [a0, a1, a2, settings, key_count] = *data else {
            return LENGTH_ERROR.to_vec();
        };
        if self.selected != PICC {
            return PERMISSION_DENIED.to_vec();
        }
        let aid = [a0, a1, a2];
        if self.apps.contains_key(&aid) {
            return DUPLICATE.to_vec();
        }
        if key_count == 0 || key_count > 14 {
            return PARAMETER_ERROR.to_vec();
        }
        self.apps.insert(aid, App::new(settings, key_count));
        OK.to_vec()
    }

    fn delete_application(&mut self, data: &[u8]) -> Vec<u8> {
        let Ok(aid) = <[u8; 3]>::try_from(data) else {
            return LENGTH_ERROR.to_vec();
        };
        if aid == PICC || self.apps.remove(&aid).is_none() {
            return APPLICATION_NOT_FOUND.to_vec();
        }
        if self.selected == aid {
            self.selected = PICC;
            self.authenticated = None;
        }
        OK.to_vec()
    }

    fn create_file(&mut self, instruction: u8, data: &[u8]) -> Vec<u8> {
        if self.selected == PICC {
            return PERMISSION_DENIED.to_vec();
        }
        let [file_id, comm, ar0, ar1, rest @ ..] = data else {
            return LENGTH_ERROR.to_vec();
        };

        let body = match (instruction, rest.len()) {
            (ins::CREATE_STD_DATA_FILE, 3) => {
                Body::Standard(vec![0; read_u24(rest).unwrap() as usize])
            }
            (ins::CREATE_VALUE_FILE, 13) => Body::Value {
                lower: read_i32(rest).unwrap(),
                upper: read_i32(&rest[4..]).unwrap(),
                value: read_i32(&rest[8..]).unwrap(),
                pending: 0,
                limited_credit: rest[12] & 0x01 != 0,
            },
            (ins::CREATE_LINEAR_RECORD_FILE | ins::CREATE_CYCLIC_RECORD_FILE, 6) => Body::Record {
                cyclic: instruction == ins::CREATE_CYCLIC_RECORD_FILE,
                record_size: read_u24(rest).unwrap() as usize,
                max_records: read_u24(&rest[3..]).unwrap() as usize,
                records: Vec::new(),
                building: None,
                clear_pending: false,
            },
            _ => return LENGTH_ERROR.to_vec(),
        };

        let files = &mut self.app().files;
        if files.contains_key(file_id) {
            return DUPLICATE.to_vec();
        }
        files.insert(
            *file_id,
            File {
                comm: *comm,
                access: [*ar0, *ar1],
                body,
            },
        );
        OK.to_vec()
    }

    fn file_settings(&mut self, data: &[u8]) -> Vec<u8> {
        let [id] = data else {
            return LENGTH_ERROR.to_vec();
        };
        let Some(file) = self.file(*id) else {
            return FILE_NOT_FOUND.to_vec();
        };

        let mut out = Vec::new();
        let kind = match &file.body {
            Body::Standard(_) => file_type::STANDARD,
            Body::Value { .. } => file_type::VALUE,
            Body::Record { cyclic: false, .. } => file_type::LINEAR_RECORD,
            Body::Record { cyclic: true, .. } => file_type::CYCLIC_RECORD,
        };
        out.push(kind);
        out.push(file.comm);
        out.extend_from_slice(&file.access);

        match &file.body {
            Body::Standard(content) => {
                out.extend_from_slice(&encode_u24(content.len() as u32).unwrap());
            }
            Body::Value {
                lower,
                upper,
                limited_credit,
                ..
            } => {
                out.extend_from_slice(&encode_i32(*lower));
                out.extend_from_slice(&encode_i32(*upper));
                out.extend_from_slice(&encode_i32(0));
                out.push(u8::from(*limited_credit));
            }
            Body::Record {
                record_size,
                max_records,
                records,
                ..
            } => {
                out.extend_from_slice(&encode_u24(*record_size as u32).unwrap());
                out.extend_from_slice(&encode_u24(*max_records as u32).unwrap());
                out.extend_from_slice(&encode_u24(records.len() as u32).unwrap());
            }
        }
        Self::frame(&out, OK)
    }

    /// Split `file_id, offset[3], length[3], data` into its fields
    fn addressed(data: &[u8]) -> Option<(u8, usize, usize, &[u8])> {
        if data.len() < 7 {
            return None;
        }
        Some((
            data[0],
            read_u24(&data[1..4]).ok()? as usize,
            read_u24(&data[4..7]).ok()? as usize,
            &data[7..],
        ))
    }

    fn write_data(&mut self, data: &[u8]) -> Vec<u8> {
        let Some((id, offset, length, payload)) = Self::addressed(data) else {
            return LENGTH_ERROR.to_vec();
        };
        if length != payload.len() {
            return LENGTH_ERROR.to_vec();
        }
        match self.file(id) {
            Some(File {
                body: Body::Standard(content),
                ..
            }) => {
                if offset + length > content.len() {
                    return BOUNDARY_ERROR.to_vec();
                }
                content[offset..offset + length].copy_from_slice(payload);
                OK.to_vec()
            }
            Some(_) => PERMISSION_DENIED.to_vec(),
            None => FILE_NOT_FOUND.to_vec(),
        }
    }

    fn read_data(&mut self, data: &[u8]) -> Vec<u8> {
        let Some((id, offset, length, [])) = Self::addressed(data) else {
            return LENGTH_ERROR.to_vec();
        };
        let slice = match self.file(id) {
            Some(File {
                body: Body::Standard(content),
                ..
            }) => {
                let end = if length == 0 {
                    content.len()
                } else {
                    offset + length
                };
                if offset > content.len() || end > content.len() {
                    return BOUNDARY_ERROR.to_vec();
                }
                content[offset..end].to_vec()
            }
            Some(_) => return PERMISSION_DENIED.to_vec(),
            None => return FILE_NOT_FOUND.to_vec(),
        };
        self.chained(&slice)
    }

    fn write_record(&mut self, data: &[u8]) -> Vec<u8> {
        let Some((id, offset, length, payload)) = Self::addressed(data) else {
            return LENGTH_ERROR.to_vec();
        };
        if length != payload.len() {
            return LENGTH_ERROR.to_vec();
        }
        match self.file(id) {
            Some(File {
                body:
                    Body::Record {
                        cyclic,
                        record_size,
                        max_records,
                        records,
                        building,
                        ..
                    },
                ..
            }) => {
                if offset + length > *record_size {
                    return BOUNDARY_ERROR.to_vec();
                }
                if !*cyclic && building.is_none() && records.len() >= *max_records {
                    return BOUNDARY_ERROR.to_vec();
                }
                let record = building.get_or_insert_with(|| vec![0; *record_size]);
                record[offset..offset + length].copy_from_slice(payload);
                OK.to_vec()
            }
            Some(_) => PERMISSION_DENIED.to_vec(),
            None => FILE_NOT_FOUND.to_vec(),
        }
    }

    fn read_records(&mut self, data: &[u8]) -> Vec<u8> {
        let Some((id, offset, count, [])) = Self::addressed(data) else {
            return LENGTH_ERROR.to_vec();
        };
        let out = match self.file(id) {
            Some(File {
                body: Body::Record { records, .. },
                ..
            }) => {
                let stored = records.len();
                if offset >= stored {
                    return BOUNDARY_ERROR.to_vec();
                }
                let available = stored - offset;
                let count = if count == 0 { available } else { count };
                if count > available {
                    return BOUNDARY_ERROR.to_vec();
                }
                // Oldest first, ending `offset` records before the newest
                records[available - count..available].concat()
            }
            Some(_) => return PERMISSION_DENIED.to_vec(),
            None => return FILE_NOT_FOUND.to_vec(),
        };
        self.chained(&out)
    }

    fn change_value(&mut self, instruction: u8, data: &[u8]) -> Vec<u8> {
        let [id, rest @ ..] = data else {
            return LENGTH_ERROR.to_vec();
        };
        let Ok(amount) = read_i32(rest) else {
            return LENGTH_ERROR.to_vec();
        };
        if rest.len() != 4 {
            return LENGTH_ERROR.to_vec();
        }
        if amount < 0 {
            return PARAMETER_ERROR.to_vec();
        }
        match self.file(*id) {
            Some(File {
                body:
                    Body::Value {
                        lower,
                        upper,
                        value,
                        pending,
                        limited_credit,
                    },
                ..
            }) => {
                let delta = match instruction {
                    ins::DEBIT => -amount,
                    ins::LIMITED_CREDIT if !*limited_credit => {
                        return PERMISSION_DENIED.to_vec();
                    }
                    _ => amount,
                };
                let next = *value + *pending + delta;
                if next < *lower || next > *upper {
                    return BOUNDARY_ERROR.to_vec();
                }
                *pending += delta;
                OK.to_vec()
            }
            Some(_) => PERMISSION_DENIED.to_vec(),
            None => FILE_NOT_FOUND.to_vec(),
        }
    }
}

impl CardTransport for SimulatedCard {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection);
        }
        self.log.push(Bytes::copy_from_slice(command));

        let response = match Command::from_bytes(command) {
            Ok(command) => self.handle(&command),
            Err(_) => LENGTH_ERROR.to_vec(),
        };
        Ok(Bytes::from(response))
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.selected = PICC;
        self.authenticated = None;
        self.pending_auth = None;
        self.outgoing.clear();
        self.connected = true;
        Ok(())
    }
}

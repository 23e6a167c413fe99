//! Positional decoding of `DANMU_MSG`.
//!
//! Unlike most commands, chat messages carry an `info` array instead of a
//! `data` object:
//!
//! ```text
//! info[0]    metadata  [_, mode, font_size, color, time, dmid, .., msg_type(10), bubble(11)]
//! info[1]    content
//! info[2]    sender    [mid, uname, admin, vip, svip, rank, mobile_verify, uname_color]
//! info[3]    medal     [level, name, anchor_name, ..]  (may be empty)
//! info[4]    level     [user_level, ..]
//! ```
//!
//! Trailing sections may be absent; a section that is present must have the
//! expected types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::DanmakuMsg;
use crate::codec::JsonCodec;
use crate::error::{LiveError, Result};

/// Decoded chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Danmaku {
    pub send_mode: i64,
    pub send_font_size: i64,
    pub danmaku_color: i64,
    /// Send time, unix milliseconds.
    pub time: i64,
    pub dmid: i64,
    pub msg_type: i64,
    pub bubble: String,
    pub content: String,
    /// Sender uid.
    pub mid: i64,
    pub uname: String,
    pub room_admin: i64,
    pub vip: i64,
    pub svip: i64,
    pub rank: i64,
    pub mobile_verify: i64,
    pub uname_color: String,
    pub medal_level: i64,
    pub medal_name: String,
    /// Name of the streamer the medal belongs to.
    pub up_name: String,
    pub user_level: i64,
}

#[derive(Deserialize)]
struct InfoBody {
    info: Vec<Value>,
}

impl DanmakuMsg {
    /// Decode the positional `info` array.
    ///
    /// # Errors
    ///
    /// [`LiveError::Decode`] if the body is not JSON with an `info` array,
    /// [`LiveError::Shape`] if a present section has the wrong shape.
    pub fn parse(&self) -> Result<Danmaku> {
        let body: InfoBody = JsonCodec::decode(Self::CMD, self.raw())?;
        let info = Section::new("info", &body.info);
        let mut dm = Danmaku::default();

        if let Some(meta) = info.section(0)? {
            dm.send_mode = meta.int(1)?;
            dm.send_font_size = meta.int(2)?;
            dm.danmaku_color = meta.int(3)?;
            dm.time = meta.int(4)?;
            dm.dmid = meta.int(5)?;
            dm.msg_type = meta.int(10)?;
            dm.bubble = meta.string(11)?;
        }
        if body.info.len() > 1 {
            dm.content = info.string(1)?;
        }
        if let Some(user) = info.section(2)? {
            dm.mid = user.int(0)?;
            dm.uname = user.string(1)?;
            dm.room_admin = user.int(2)?;
            dm.vip = user.int(3)?;
            dm.svip = user.int(4)?;
            dm.rank = user.int(5)?;
            dm.mobile_verify = user.int(6)?;
            dm.uname_color = user.string(7)?;
        }
        if let Some(medal) = info.section(3)? {
            let len = medal.items.len();
            if len > 0 {
                dm.medal_level = medal.int(0)?;
            }
            if len > 1 {
                dm.medal_name = medal.string(1)?;
            }
            if len > 2 {
                dm.up_name = medal.string(2)?;
            }
        }
        if let Some(level) = info.section(4)? {
            dm.user_level = level.int(0)?;
        }

        Ok(dm)
    }
}

/// A JSON array with a path used in shape errors.
struct Section<'a> {
    path: String,
    items: &'a [Value],
}

impl<'a> Section<'a> {
    fn new(path: impl Into<String>, items: &'a [Value]) -> Self {
        Self {
            path: path.into(),
            items,
        }
    }

    fn shape(&self, reason: String) -> LiveError {
        LiveError::Shape {
            cmd: DanmakuMsg::CMD.to_string(),
            reason,
        }
    }

    fn get(&self, index: usize) -> Result<&'a Value> {
        self.items.get(index).ok_or_else(|| {
            self.shape(format!(
                "{}[{}] missing, array has {} items",
                self.path,
                index,
                self.items.len()
            ))
        })
    }

    /// Nested array at `index`, `None` if the outer array is too short.
    fn section(&self, index: usize) -> Result<Option<Section<'a>>> {
        match self.items.get(index) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                Ok(Some(Section::new(format!("{}[{}]", self.path, index), items)))
            }
            Some(other) => Err(self.shape(format!(
                "{}[{}] is not an array: {}",
                self.path, index, other
            ))),
        }
    }

    /// Integer at `index`. Floats are accepted only with no fractional part.
    fn int(&self, index: usize) -> Result<i64> {
        let value = self.get(index)?;
        value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| {
                self.shape(format!(
                    "{}[{}] is not an integer: {}",
                    self.path, index, value
                ))
            })
    }

    fn string(&self, index: usize) -> Result<String> {
        match self.get(index)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.shape(format!(
                "{}[{}] is not a string: {}",
                self.path, index, other
            ))),
        }
    }
}

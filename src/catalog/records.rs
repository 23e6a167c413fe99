//! Typed records for commands whose payload is a JSON object.
//!
//! Most commands nest their payload under `data`; `NOTICE_MSG` puts it at the
//! top level. Missing fields fall back to their defaults and `null` nested
//! objects are treated as empty, but a present field of the wrong type is a
//! [`LiveError::Decode`](crate::LiveError::Decode).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::registry::*;
use crate::codec::JsonCodec;
use crate::error::Result;

fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! data_records {
    ( $( $kind:ident => $record:ty ),+ $(,)? ) => {
        $(
            impl $kind {
                /// Decode the `data` object of the body.
                pub fn parse(&self) -> Result<$record> {
                    JsonCodec::decode_data(Self::CMD, self.raw())
                }
            }
        )+
    };
}

data_records! {
    SendGiftMsg => SendGift,
    FansUpdateMsg => FansUpdate,
    SuperChatMsg => SuperChat,
    SuperChatJpnMsg => SuperChatJpn,
    HotRankSettlementMsg => HotRankSettlement,
    OnlineRankTop3Msg => OnlineRankTop3,
    RoomBlockMsg => RoomBlock,
    OnlineRankV2Msg => OnlineRankV2,
    HotRankChangedMsg => HotRankChanged,
    GuardBuyMsg => GuardBuy,
    UserToastMsg => UserToast,
    AnchorLotStartMsg => AnchorLotStart,
    AnchorLotCheckStatusMsg => AnchorLotCheckStatus,
    AnchorLotAwardMsg => AnchorLotAward,
    RoomChangeMsg => RoomChange,
    VoiceJoinListMsg => VoiceJoinList,
    VoiceJoinRoomCountInfoMsg => VoiceJoinRoomCountInfo,
    InteractWordMsg => InteractWord,
    WatchedChangeMsg => WatchedChange,
}

impl NoticeMsg {
    /// Decode the body; this command has no `data` wrapper.
    pub fn parse(&self) -> Result<Notice> {
        JsonCodec::decode(Self::CMD, self.raw())
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct CountData {
    count: i64,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RoomIdList {
    #[serde(deserialize_with = "null_default")]
    room_id_list: Vec<i64>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct IdList {
    #[serde(deserialize_with = "null_default")]
    ids: Vec<i64>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct LotId {
    id: i64,
}

impl OnlineRankCountMsg {
    /// Number of viewers on the high-energy rank.
    pub fn count(&self) -> Result<i64> {
        JsonCodec::decode_data::<CountData>(Self::CMD, self.raw()).map(|d| d.count)
    }
}

impl StopLiveRoomListMsg {
    /// Rooms that just stopped streaming.
    pub fn room_ids(&self) -> Result<Vec<i64>> {
        JsonCodec::decode_data::<RoomIdList>(Self::CMD, self.raw()).map(|d| d.room_id_list)
    }
}

impl SuperChatDeleteMsg {
    /// Ids of the removed super chats.
    pub fn ids(&self) -> Result<Vec<i64>> {
        JsonCodec::decode_data::<IdList>(Self::CMD, self.raw()).map(|d| d.ids)
    }
}

impl AnchorLotEndMsg {
    /// Id of the finished lottery.
    pub fn lot_id(&self) -> Result<i64> {
        JsonCodec::decode_data::<LotId>(Self::CMD, self.raw()).map(|d| d.id)
    }
}

// ---------------------------------------------------------------------------
// Gifts
// ---------------------------------------------------------------------------

/// `SEND_GIFT` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendGift {
    pub action: String,
    pub batch_combo_id: String,
    #[serde(deserialize_with = "null_default")]
    pub batch_combo_send: BatchComboSend,
    #[serde(rename = "beatId")]
    pub beat_id: String,
    pub biz_source: String,
    pub blind_gift: Value,
    pub broadcast_id: i64,
    pub coin_type: String,
    pub combo_resources_id: i64,
    #[serde(deserialize_with = "null_default")]
    pub combo_send: ComboSendInfo,
    pub combo_stay_time: i64,
    pub combo_total_coin: i64,
    pub crit_prob: i64,
    pub demarcation: i64,
    pub discount_price: i64,
    pub dmscore: i64,
    pub draw: i64,
    pub effect: i64,
    pub effect_block: i64,
    pub face: String,
    pub float_sc_resource_id: i64,
    #[serde(rename = "giftId")]
    pub gift_id: i64,
    #[serde(rename = "giftName")]
    pub gift_name: String,
    #[serde(rename = "giftType")]
    pub gift_type: i64,
    pub gold: i64,
    pub guard_level: i64,
    pub is_first: bool,
    pub is_special_batch: i64,
    pub magnification: f64,
    #[serde(deserialize_with = "null_default")]
    pub medal_info: GiftMedal,
    pub name_color: String,
    pub num: i64,
    pub original_gift_name: String,
    pub price: i64,
    pub rcost: i64,
    pub remain: i64,
    pub rnd: String,
    pub send_master: Value,
    pub silver: i64,
    #[serde(rename = "super")]
    pub super_gift: i64,
    pub super_batch_gift_num: i64,
    pub super_gift_num: i64,
    pub svga_block: i64,
    pub tag_image: String,
    pub tid: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub top_list: Value,
    pub total_coin: i64,
    pub uid: i64,
    pub uname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchComboSend {
    pub action: String,
    pub batch_combo_id: String,
    pub batch_combo_num: i64,
    pub blind_gift: Value,
    pub gift_id: i64,
    pub gift_name: String,
    pub gift_num: i64,
    pub send_master: Value,
    pub uid: i64,
    pub uname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboSendInfo {
    pub action: String,
    pub combo_id: String,
    pub combo_num: i64,
    pub gift_id: i64,
    pub gift_name: String,
    pub gift_num: i64,
    pub send_master: Value,
    pub uid: i64,
    pub uname: String,
}

/// Fan medal attached to gifts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftMedal {
    pub anchor_roomid: i64,
    pub anchor_uname: String,
    pub guard_level: i64,
    pub icon_id: i64,
    pub is_lighted: i64,
    pub medal_color: i64,
    pub medal_color_border: i64,
    pub medal_color_end: i64,
    pub medal_color_start: i64,
    pub medal_level: i64,
    pub medal_name: String,
    pub special: String,
    pub target_id: i64,
}

/// `GUARD_BUY` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardBuy {
    /// 1 governor, 2 admiral, 3 captain.
    pub guard_level: i64,
    pub price: i64,
    pub uid: i64,
    pub num: i64,
    pub gift_id: i64,
    pub gift_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub username: String,
}

/// `USER_TOAST_MSG` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserToast {
    pub guard_level: i64,
    pub op_type: i64,
    pub payflow_id: String,
    pub unit: String,
    pub is_show: i64,
    pub num: i64,
    pub price: i64,
    pub start_time: i64,
    pub svga_block: i64,
    pub user_show: bool,
    pub color: String,
    pub end_time: i64,
    pub role_name: String,
    pub toast_msg: String,
    pub uid: i64,
    pub anchor_show: bool,
    pub dmscore: i64,
    pub target_guard_count: i64,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Super chat
// ---------------------------------------------------------------------------

/// `SUPER_CHAT_MESSAGE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperChat {
    pub background_bottom_color: String,
    pub token: String,
    pub background_color_end: String,
    pub background_image: String,
    pub background_icon: String,
    pub background_price_color: String,
    pub dmscore: i64,
    pub id: i64,
    #[serde(deserialize_with = "null_default")]
    pub user_info: SuperChatUser,
    pub is_send_audit: i64,
    pub price: i64,
    pub background_color: String,
    pub color_point: f64,
    #[serde(deserialize_with = "null_default")]
    pub gift: SuperChatGift,
    #[serde(deserialize_with = "null_default")]
    pub medal_info: SuperChatMedal,
    pub trans_mark: i64,
    pub ts: i64,
    pub background_color_start: String,
    pub end_time: i64,
    pub message_font_color: String,
    pub rate: i64,
    pub message_trans: String,
    pub start_time: i64,
    pub is_ranked: i64,
    pub message: String,
    pub time: i64,
    pub uid: i64,
}

/// `SUPER_CHAT_MESSAGE_JPN` payload.
///
/// Ids arrive as strings in this variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperChatJpn {
    pub uid: String,
    pub is_ranked: i64,
    #[serde(deserialize_with = "null_default")]
    pub medal_info: SuperChatMedal,
    #[serde(deserialize_with = "null_default")]
    pub user_info: SuperChatUser,
    pub id: String,
    pub message_jpn: String,
    pub time: i64,
    pub rate: i64,
    pub background_image: String,
    pub background_icon: String,
    pub background_price_color: String,
    pub token: String,
    #[serde(deserialize_with = "null_default")]
    pub gift: SuperChatGift,
    pub price: i64,
    pub message: String,
    pub background_color: String,
    pub background_bottom_color: String,
    pub ts: i64,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperChatUser {
    pub user_level: i64,
    pub face_frame: String,
    pub guard_level: i64,
    pub level_color: String,
    pub manager: i64,
    pub uname: String,
    pub title: String,
    pub face: String,
    pub is_main_vip: i64,
    pub is_svip: i64,
    pub is_vip: i64,
    pub name_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperChatGift {
    pub gift_id: i64,
    pub gift_name: String,
    pub num: i64,
}

/// Fan medal attached to super chats; `medal_color` is a CSS string here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperChatMedal {
    pub target_id: i64,
    pub anchor_roomid: i64,
    pub anchor_uname: String,
    pub guard_level: i64,
    pub medal_color: String,
    pub medal_color_end: i64,
    pub medal_level: i64,
    pub special: String,
    pub icon_id: i64,
    pub is_lighted: i64,
    pub medal_color_border: i64,
    pub medal_color_start: i64,
    pub medal_name: String,
}

// ---------------------------------------------------------------------------
// Room state and ranks
// ---------------------------------------------------------------------------

/// `ROOM_REAL_TIME_MESSAGE_UPDATE` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FansUpdate {
    pub fans_club: i64,
    pub roomid: i64,
    pub fans: i64,
    pub red_notice: i64,
}

/// `WATCHED_CHANGE` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchedChange {
    pub num: i64,
    /// e.g. "14.4万人看过".
    pub text_large: String,
    /// e.g. "14.4万".
    pub text_small: String,
}

/// `ROOM_CHANGE` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomChange {
    pub parent_area_id: i64,
    pub area_name: String,
    pub parent_area_name: String,
    pub live_key: String,
    pub sub_session_key: String,
    pub title: String,
    pub area_id: i64,
}

/// `ROOM_BLOCK_MSG` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomBlock {
    pub uname: String,
    pub dmscore: i64,
    pub operator: i64,
    pub uid: i64,
}

/// `HOT_RANK_CHANGED` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotRankChanged {
    pub rank: i64,
    pub timestamp: i64,
    pub web_url: String,
    pub live_url: String,
    pub live_link_url: String,
    pub area_name: String,
    pub trend: i64,
    pub countdown: i64,
    pub blink_url: String,
    pub pc_link_url: String,
    pub icon: String,
}

/// `HOT_RANK_SETTLEMENT` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotRankSettlement {
    pub dm_msg: String,
    pub dmscore: i64,
    pub timestamp: i64,
    pub uname: String,
    pub url: String,
    pub area_name: String,
    pub cache_key: String,
    pub rank: i64,
    pub face: String,
    pub icon: String,
}

/// `ONLINE_RANK_TOP3` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineRankTop3 {
    pub dmscore: i64,
    #[serde(deserialize_with = "null_default")]
    pub list: Vec<RankNotice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankNotice {
    pub msg: String,
    pub rank: i64,
}

/// `ONLINE_RANK_V2` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineRankV2 {
    #[serde(deserialize_with = "null_default")]
    pub list: Vec<RankEntry>,
    pub rank_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankEntry {
    pub guard_level: i64,
    pub uid: i64,
    pub face: String,
    /// Contribution score, sent as a string.
    pub score: String,
    pub uname: String,
    pub rank: i64,
}

/// `INTERACT_WORD` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractWord {
    pub tail_icon: i64,
    pub uid: i64,
    pub uname: String,
    pub uname_color: String,
    pub dmscore: i64,
    pub score: i64,
    pub spread_desc: String,
    pub timestamp: i64,
    #[serde(deserialize_with = "null_default")]
    pub identities: Vec<i64>,
    pub is_spread: i64,
    pub roomid: i64,
    pub trigger_time: i64,
    #[serde(deserialize_with = "null_default")]
    pub contribution: Contribution,
    #[serde(deserialize_with = "null_default")]
    pub fans_medal: FansMedal,
    /// 1 entered, 2 followed, 3 shared.
    pub msg_type: i64,
    pub spread_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contribution {
    pub grade: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FansMedal {
    pub medal_color: i64,
    pub medal_color_start: i64,
    pub medal_level: i64,
    pub score: i64,
    pub target_id: i64,
    pub guard_level: i64,
    pub icon_id: i64,
    pub is_lighted: i64,
    pub medal_name: String,
    pub special: String,
    pub anchor_roomid: i64,
    pub medal_color_border: i64,
    pub medal_color_end: i64,
}

/// `NOTICE_MSG` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notice {
    pub business_id: String,
    #[serde(deserialize_with = "null_default")]
    pub full: NoticeFull,
    #[serde(deserialize_with = "null_default")]
    pub half: NoticeHalf,
    pub id: i64,
    pub link_url: String,
    pub msg_common: String,
    pub msg_self: String,
    pub msg_type: i64,
    pub name: String,
    pub real_roomid: i64,
    pub roomid: i64,
    #[serde(deserialize_with = "null_default")]
    pub scatter: NoticeScatter,
    pub shield_uid: i64,
    #[serde(deserialize_with = "null_default")]
    pub side: NoticeSide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeFull {
    pub head_icon: String,
    pub tail_icon: String,
    pub head_icon_fa: String,
    pub tail_icon_fa: String,
    pub background: String,
    pub highlight: String,
    pub head_icon_fan: i64,
    pub tail_icon_fan: i64,
    pub color: String,
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeHalf {
    pub time: i64,
    pub head_icon: String,
    pub tail_icon: String,
    pub background: String,
    pub color: String,
    pub highlight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeScatter {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeSide {
    pub head_icon: String,
    pub background: String,
    pub color: String,
    pub highlight: String,
    pub border: String,
}

// ---------------------------------------------------------------------------
// Lottery and voice link
// ---------------------------------------------------------------------------

/// `ANCHOR_LOT_START` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorLotStart {
    pub max_time: i64,
    pub danmu: String,
    pub gift_num: i64,
    pub join_type: i64,
    pub award_image: String,
    pub gift_price: i64,
    pub gift_id: i64,
    pub gift_name: String,
    pub goods_id: i64,
    pub room_id: i64,
    pub time: i64,
    pub url: String,
    pub cur_gift_num: i64,
    pub current_time: i64,
    pub lot_status: i64,
    pub require_type: i64,
    pub web_url: String,
    pub goaway_time: i64,
    pub is_broadcast: i64,
    pub require_value: i64,
    pub show_panel: i64,
    pub status: i64,
    pub id: i64,
    pub require_text: String,
    pub award_num: i64,
    pub asset_icon: String,
    pub award_name: String,
    pub send_gift_ensure: i64,
}

/// `ANCHOR_LOT_CHECKSTATUS` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorLotCheckStatus {
    pub id: i64,
    pub reject_reason: String,
    pub status: i64,
    pub uid: i64,
}

/// `ANCHOR_LOT_AWARD` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorLotAward {
    pub lot_status: i64,
    pub url: String,
    pub web_url: String,
    pub award_image: String,
    pub award_name: String,
    pub award_num: i64,
    #[serde(deserialize_with = "null_default")]
    pub award_users: Vec<AwardUser>,
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardUser {
    pub uname: String,
    pub face: String,
    pub level: i64,
    pub color: i64,
    pub uid: i64,
}

/// `VOICE_JOIN_LIST` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceJoinList {
    pub room_id: i64,
    pub category: i64,
    pub apply_count: i64,
    pub red_point: i64,
    pub refresh: i64,
}

/// `VOICE_JOIN_ROOM_COUNT_INFO` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceJoinRoomCountInfo {
    pub apply_count: i64,
    pub notify_count: i64,
    pub red_point: i64,
    pub room_id: i64,
    pub root_status: i64,
    pub room_status: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{classify, Message};
    use crate::error::LiveError;
    use crate::protocol::{Operation, Packet};
    use bytes::Bytes;

    fn message(body: &str) -> Message {
        classify(Packet::new(
            Operation::Message,
            Bytes::copy_from_slice(body.as_bytes()),
        ))
        .unwrap()
    }

    #[test]
    fn test_send_gift() {
        let msg = message(
            r#"{"cmd":"SEND_GIFT","data":{"action":"投喂","giftName":"辣条","giftId":1,"num":3,"uname":"bob","uid":7,"timestamp":1650000000,"coin_type":"silver","medal_info":null}}"#,
        );
        let Message::SendGift(gift) = msg else {
            panic!("expected SEND_GIFT");
        };
        let gift = gift.parse().unwrap();
        assert_eq!(gift.action, "投喂");
        assert_eq!(gift.gift_name, "辣条");
        assert_eq!(gift.gift_id, 1);
        assert_eq!(gift.num, 3);
        assert_eq!(gift.uid, 7);
        assert_eq!(gift.medal_info, GiftMedal::default());
    }

    #[test]
    fn test_send_gift_type_mismatch() {
        let msg = message(r#"{"cmd":"SEND_GIFT","data":{"num":"three"}}"#);
        let Message::SendGift(gift) = msg else {
            panic!("expected SEND_GIFT");
        };
        match gift.parse().unwrap_err() {
            LiveError::Decode { cmd, .. } => assert_eq!(cmd, "SEND_GIFT"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fans_update() {
        let msg = message(
            r#"{"cmd":"ROOM_REAL_TIME_MESSAGE_UPDATE","data":{"fans_club":49182,"roomid":545068,"fans":1384297,"red_notice":-1}}"#,
        );
        let Message::FansUpdate(update) = msg else {
            panic!("expected fans update");
        };
        assert_eq!(
            update.parse().unwrap(),
            FansUpdate {
                fans_club: 49182,
                roomid: 545068,
                fans: 1384297,
                red_notice: -1,
            }
        );
    }

    #[test]
    fn test_notice_is_top_level() {
        let msg = message(
            r#"{"cmd":"NOTICE_MSG","id":9,"name":"broadcast","msg_common":"hi","real_roomid":100,"scatter":{"min":1,"max":2}}"#,
        );
        let Message::Notice(notice) = msg else {
            panic!("expected notice");
        };
        let notice = notice.parse().unwrap();
        assert_eq!(notice.id, 9);
        assert_eq!(notice.real_roomid, 100);
        assert_eq!(notice.scatter, NoticeScatter { min: 1, max: 2 });
    }

    #[test]
    fn test_narrow_accessors() {
        let Message::OnlineRankCount(count) =
            message(r#"{"cmd":"ONLINE_RANK_COUNT","data":{"count":12}}"#)
        else {
            panic!("expected ONLINE_RANK_COUNT");
        };
        assert_eq!(count.count().unwrap(), 12);

        let Message::StopLiveRoomList(list) =
            message(r#"{"cmd":"STOP_LIVE_ROOM_LIST","data":{"room_id_list":[1,2,3]}}"#)
        else {
            panic!("expected STOP_LIVE_ROOM_LIST");
        };
        assert_eq!(list.room_ids().unwrap(), vec![1, 2, 3]);

        let Message::SuperChatDelete(deleted) =
            message(r#"{"cmd":"SUPER_CHAT_MESSAGE_DELETE","data":{"ids":[5]}}"#)
        else {
            panic!("expected SUPER_CHAT_MESSAGE_DELETE");
        };
        assert_eq!(deleted.ids().unwrap(), vec![5]);

        let Message::AnchorLotEnd(end) = message(r#"{"cmd":"ANCHOR_LOT_END","data":{"id":77}}"#)
        else {
            panic!("expected ANCHOR_LOT_END");
        };
        assert_eq!(end.lot_id().unwrap(), 77);
    }

    #[test]
    fn test_accessor_without_data_is_error() {
        let Message::OnlineRankCount(count) = message(r#"{"cmd":"ONLINE_RANK_COUNT"}"#) else {
            panic!("expected ONLINE_RANK_COUNT");
        };
        assert!(count.count().is_err());
    }

    #[test]
    fn test_interact_word_and_watched() {
        let Message::InteractWord(word) = message(
            r#"{"cmd":"INTERACT_WORD","data":{"uid":1,"uname":"u","msg_type":1,"identities":[1,3],"fans_medal":{"medal_level":5,"medal_name":"m"}}}"#,
        ) else {
            panic!("expected INTERACT_WORD");
        };
        let word = word.parse().unwrap();
        assert_eq!(word.identities, vec![1, 3]);
        assert_eq!(word.fans_medal.medal_level, 5);

        let Message::WatchedChange(watched) = message(
            r#"{"cmd":"WATCHED_CHANGE","data":{"num":144450,"text_large":"14.4万人看过","text_small":"14.4万"}}"#,
        ) else {
            panic!("expected WATCHED_CHANGE");
        };
        assert_eq!(watched.parse().unwrap().num, 144450);
    }
}

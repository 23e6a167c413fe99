//! Command registry.
//!
//! One macro invocation declares every known command: its `Message` variant,
//! its per-kind struct and its wire `cmd` string. The macro expands to the
//! structs, the `Message` enum and a static `cmd -> constructor` map, so
//! adding a command is a one-line change here.

use std::collections::HashMap;

use bytes::Bytes;
use once_cell::sync::Lazy;

use super::{Generic, HeartbeatReply, JoinReply};

/// Builds a `Message` from a JSON body.
pub(super) type Constructor = fn(Bytes) -> Message;

macro_rules! catalog {
    ( $( $(#[$doc:meta])* $variant:ident($kind:ident) = $cmd:literal; )+ ) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone)]
            pub struct $kind {
                raw: Bytes,
            }

            impl $kind {
                /// Command string this kind is registered under.
                pub const CMD: &'static str = $cmd;

                /// The registered command string.
                #[inline]
                pub fn cmd(&self) -> &str {
                    Self::CMD
                }

                /// The full JSON body.
                #[inline]
                pub fn raw(&self) -> &[u8] {
                    &self.raw
                }
            }
        )+

        /// A classified inbound message.
        ///
        /// Every variant exposes `cmd()` and `raw()`; typed kinds add `parse()`.
        #[derive(Debug, Clone)]
        #[non_exhaustive]
        pub enum Message {
            /// Popularity count pushed in reply to a heartbeat.
            HeartbeatReply(HeartbeatReply),
            /// Server acknowledgement of the join request.
            JoinReply(JoinReply),
            $( $(#[$doc])* $variant($kind), )+
            /// Any command without a registered kind.
            Generic(Generic),
        }

        impl Message {
            /// Command string of the message.
            pub fn cmd(&self) -> &str {
                match self {
                    Message::HeartbeatReply(m) => m.cmd(),
                    Message::JoinReply(m) => m.cmd(),
                    $( Message::$variant(m) => m.cmd(), )+
                    Message::Generic(m) => m.cmd(),
                }
            }

            /// Body bytes of the message.
            pub fn raw(&self) -> &[u8] {
                match self {
                    Message::HeartbeatReply(m) => m.raw(),
                    Message::JoinReply(m) => m.raw(),
                    $( Message::$variant(m) => m.raw(), )+
                    Message::Generic(m) => m.raw(),
                }
            }
        }

        /// Every registered command string, in declaration order.
        pub const COMMANDS: &[&str] = &[ $( $cmd, )+ ];

        static REGISTRY: Lazy<HashMap<&'static str, Constructor>> = Lazy::new(|| {
            let mut map: HashMap<&'static str, Constructor> = HashMap::with_capacity(COMMANDS.len());
            $( map.insert($cmd, |raw| Message::$variant($kind { raw })); )+
            map
        });
    };
}

catalog! {
    /// Chat message (`DANMU_MSG`).
    Danmaku(DanmakuMsg) = "DANMU_MSG";
    /// Gift sent.
    SendGift(SendGiftMsg) = "SEND_GIFT";
    /// Combo gift.
    ComboSend(ComboSendMsg) = "COMBO_SEND";
    /// Room follower counts changed.
    FansUpdate(FansUpdateMsg) = "ROOM_REAL_TIME_MESSAGE_UPDATE";
    /// High-energy rank size changed.
    OnlineRankCount(OnlineRankCountMsg) = "ONLINE_RANK_COUNT";
    /// Paid pinned message.
    SuperChat(SuperChatMsg) = "SUPER_CHAT_MESSAGE";
    /// Made the hot rank top list.
    HotRankSettlement(HotRankSettlementMsg) = "HOT_RANK_SETTLEMENT";
    /// High-energy rank top 3 changed.
    OnlineRankTop3(OnlineRankTop3Msg) = "ONLINE_RANK_TOP3";
    /// A user was muted.
    RoomBlock(RoomBlockMsg) = "ROOM_BLOCK_MSG";
    /// Rooms that just stopped streaming.
    StopLiveRoomList(StopLiveRoomListMsg) = "STOP_LIVE_ROOM_LIST";
    /// High-energy rank list.
    OnlineRankV2(OnlineRankV2Msg) = "ONLINE_RANK_V2";
    /// Platform-wide broadcast.
    Notice(NoticeMsg) = "NOTICE_MSG";
    /// Hot rank position changed.
    HotRankChanged(HotRankChangedMsg) = "HOT_RANK_CHANGED";
    /// Guard membership bought.
    GuardBuy(GuardBuyMsg) = "GUARD_BUY";
    /// Translated super chat.
    SuperChatJpn(SuperChatJpnMsg) = "SUPER_CHAT_MESSAGE_JPN";
    /// Toast shown when a guard membership is bought.
    UserToast(UserToastMsg) = "USER_TOAST_MSG";
    /// Super chats removed.
    SuperChatDelete(SuperChatDeleteMsg) = "SUPER_CHAT_MESSAGE_DELETE";
    /// Lottery started.
    AnchorLotStart(AnchorLotStartMsg) = "ANCHOR_LOT_START";
    /// Lottery review status.
    AnchorLotCheckStatus(AnchorLotCheckStatusMsg) = "ANCHOR_LOT_CHECKSTATUS";
    /// Lottery winners.
    AnchorLotAward(AnchorLotAwardMsg) = "ANCHOR_LOT_AWARD";
    /// Lottery ended.
    AnchorLotEnd(AnchorLotEndMsg) = "ANCHOR_LOT_END";
    /// Room title or area changed.
    RoomChange(RoomChangeMsg) = "ROOM_CHANGE";
    /// Voice link applications changed.
    VoiceJoinList(VoiceJoinListMsg) = "VOICE_JOIN_LIST";
    /// Voice link queue changed.
    VoiceJoinRoomCountInfo(VoiceJoinRoomCountInfoMsg) = "VOICE_JOIN_ROOM_COUNT_INFO";
    /// Voice link started or ended.
    VoiceJoinStatus(VoiceJoinStatusMsg) = "VOICE_JOIN_STATUS";
    Attention(AttentionMsg) = "ATTENTION";
    Share(ShareMsg) = "SHARE";
    SpecialAttention(SpecialAttentionMsg) = "SPECIAL_ATTENTION";
    System(SystemMsg) = "SYS_MSG";
    /// Stream ended.
    Preparing(PreparingMsg) = "PREPARING";
    /// Stream started.
    Live(LiveMsg) = "LIVE";
    RoomRank(RoomRankMsg) = "ROOM_RANK";
    RoomLimit(RoomLimitMsg) = "ROOM_LIMIT";
    Block(BlockMsg) = "BLOCK";
    PkPre(PkPreMsg) = "PK_PRE";
    PkEnd(PkEndMsg) = "PK_END";
    PkSettle(PkSettleMsg) = "PK_SETTLE";
    SysGift(SysGiftMsg) = "SYS_GIFT";
    HotRank(HotRankMsg) = "HOT_RANK";
    ActivityRedPacket(ActivityRedPacketMsg) = "ACTIVITY_RED_PACKET";
    PkMicEnd(PkMicEndMsg) = "PK_MIC_END";
    PlayTag(PlayTagMsg) = "PLAY_TAG";
    /// Guard notice.
    GuardNotice(GuardNoticeMsg) = "GUARD_MSG";
    PlayProgressBar(PlayProgressBarMsg) = "PLAY_PROGRESS_BAR";
    HotRoomNotify(HotRoomNotifyMsg) = "HOT_ROOM_NOTIFY";
    Refresh(RefreshMsg) = "REFRESH";
    Round(RoundMsg) = "ROUND";
    WelcomeGuard(WelcomeGuardMsg) = "WELCOME_GUARD";
    /// Guard or high-rank viewer entered.
    EntryEffect(EntryEffectMsg) = "ENTRY_EFFECT";
    Welcome(WelcomeMsg) = "WELCOME";
    LiveInteractiveGame(LiveInteractiveGameMsg) = "LIVE_INTERACTIVE_GAME";
    /// Stream cut by a moderator.
    CutOff(CutOffMsg) = "CUT_OFF";
    SpecialGift(SpecialGiftMsg) = "SPECIAL_GIFT";
    /// Guard count changed.
    NewGuardCount(NewGuardCountMsg) = "NEW_GUARD_COUNT";
    RoomAdmins(RoomAdminsMsg) = "ROOM_ADMINS";
    ActivityBannerUpdateV2(ActivityBannerUpdateV2Msg) = "ACTIVITY_BANNER_UPDATE_V2";
    /// Viewer entered or followed.
    InteractWord(InteractWordMsg) = "INTERACT_WORD";
    PkBattlePre(PkBattlePreMsg) = "PK_BATTLE_PRE";
    PkBattleSettle(PkBattleSettleMsg) = "PK_BATTLE_SETTLE";
    PkBattleStart(PkBattleStartMsg) = "PK_BATTLE_START";
    PkBattleProcess(PkBattleProcessMsg) = "PK_BATTLE_PROCESS";
    PkEnding(PkEndingMsg) = "PK_ENDING";
    PkBattleEnd(PkBattleEndMsg) = "PK_BATTLE_END";
    PkBattleSettleUser(PkBattleSettleUserMsg) = "PK_BATTLE_SETTLE_USER";
    PkBattleSettleV2(PkBattleSettleV2Msg) = "PK_BATTLE_SETTLE_V2";
    PkLotteryStart(PkLotteryStartMsg) = "PK_LOTTERY_START";
    PkBestUname(PkBestUnameMsg) = "PK_BEST_UNAME";
    CallOnOpposite(CallOnOppositeMsg) = "CALL_ON_OPPOSITE";
    AttentionOpposite(AttentionOppositeMsg) = "ATTENTION_OPPOSITE";
    ShareOpposite(ShareOppositeMsg) = "SHARE_OPPOSITE";
    AttentionOnOpposite(AttentionOnOppositeMsg) = "ATTENTION_ON_OPPOSITE";
    PkMatchInfo(PkMatchInfoMsg) = "PK_MATCH_INFO";
    PkMatchOnlineGuard(PkMatchOnlineGuardMsg) = "PK_MATCH_ONLINE_GUARD";
    PkWinningStreak(PkWinningStreakMsg) = "PK_WINNING_STREAK";
    /// Chat from the opposing PK room.
    PkDanmaku(PkDanmakuMsg) = "PK_DANMU_MSG";
    PkSendGift(PkSendGiftMsg) = "PK_SEND_GIFT";
    PkInteractWord(PkInteractWordMsg) = "PK_INTERACT_WORD";
    PkAttention(PkAttentionMsg) = "PK_ATTENTION";
    PkShare(PkShareMsg) = "PK_SHARE";
    /// "Watched" counter changed.
    WatchedChange(WatchedChangeMsg) = "WATCHED_CHANGE";
}

/// Look up the constructor for a bare (suffix-free) command.
#[inline]
pub(super) fn lookup(cmd: &str) -> Option<Constructor> {
    REGISTRY.get(cmd).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicate_commands() {
        assert_eq!(REGISTRY.len(), COMMANDS.len());
    }

    #[test]
    fn test_every_command_constructs_its_own_kind() {
        for cmd in COMMANDS {
            let build = lookup(cmd).unwrap();
            let message = build(Bytes::from_static(b"{}"));
            assert_eq!(message.cmd(), *cmd);
            assert_eq!(message.raw(), b"{}");
        }
    }

    #[test]
    fn test_lookup_miss() {
        assert!(lookup("NOT_A_COMMAND").is_none());
        assert!(lookup("DANMU_MSG:4:0:2:2:2:0").is_none());
    }
}

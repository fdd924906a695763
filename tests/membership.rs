//! Channel membership: JOIN, NAMES, PART, QUIT, NICK and MODE.

mod common;

use common::TestSession;
use possel::{ChannelError, Event, EventKind, RegistryError, SessionError};
use possel_proto::ModeParseError;

// ============================================================================
// JOIN / NAMES
// ============================================================================

#[test]
fn double_join_is_rejected() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #test");

    let err = s.try_feed(":bob!b@h JOIN #test").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Channel(ChannelError::UserAlreadyExists { ref nick, ref channel })
            if nick == "bob" && channel == "#test"
    ));
    assert_eq!(s.members("#test"), vec!["bob"]);
}

#[test]
fn names_reply_is_idempotent() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #test :possel @alice +bob carol");
    s.feed(":srv 353 possel = #test :possel @alice +bob carol");

    assert_eq!(s.members("#test"), vec!["alice", "bob", "carol", "possel"]);
    let memberships = s
        .events()
        .iter()
        .filter(|e| e.kind() == EventKind::NewMembership)
        .count();
    assert_eq!(memberships, 4);
}

#[test]
fn names_prefixes_become_channel_modes() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #Test :@alice +bob carol");

    let users = s.engine.users();
    let key = s.engine.channels().key("#Test");
    assert!(users.get(s.id_of("alice")).unwrap().has_mode(&key, 'o'));
    assert!(users.get(s.id_of("bob")).unwrap().has_mode(&key, 'v'));
    assert!(users.get(s.id_of("carol")).unwrap().modes_in(&key).is_none());
    assert_eq!(
        users.get(s.id_of("alice")).unwrap().to_string(),
        "alice!alice +o"
    );
}

#[test]
fn every_creation_path_announces_new_users() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #x :alice");
    s.feed(":op!o@h MODE #x +v bob");
    s.feed(":carol!c@h PRIVMSG #x :hi");

    let created: Vec<String> = s
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::NewUser { user } => Some(user.nick),
            _ => None,
        })
        .collect();
    assert_eq!(created, vec!["alice", "bob", "carol"]);
}

#[test]
fn names_then_join_after_part_is_fine() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #test :bob");
    s.feed(":bob!b@h PART #test");
    s.feed(":bob!b@h JOIN #test");
    assert_eq!(s.members("#test"), vec!["bob"]);
}

#[test]
fn bare_nick_and_full_prefix_converge() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #test :alice");
    let placeholder = s.id_of("alice");
    assert!(!s.engine.users().get(placeholder).unwrap().fully_known);

    s.feed(":alice!a@host PRIVMSG #test :hi");
    assert_eq!(s.id_of("alice"), placeholder);
    let alice = s.engine.users().get(placeholder).unwrap();
    assert!(alice.fully_known);
    assert_eq!(alice.username, "a");
    assert_eq!(alice.host.as_deref(), Some("host"));
}

#[test]
fn self_join_creates_channel_without_membership_event() {
    let mut s = TestSession::new();
    s.feed(":possel!p@host JOIN #possel");
    s.feed(":possel!p@host JOIN #possel");

    assert!(s.engine.channels().contains("#possel"));
    assert_eq!(
        s.events(),
        vec![Event::NewChannel {
            channel: "#possel".to_string()
        }]
    );
}

#[test]
fn channel_names_fold_case() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #Rust");
    s.feed(":carol!c@h JOIN #rust");
    assert_eq!(s.members("#RUST"), vec!["bob", "carol"]);
    assert_eq!(s.engine.channels().len(), 1);
}

// ============================================================================
// PART / QUIT
// ============================================================================

#[test]
fn part_of_non_member_is_rejected() {
    let mut s = TestSession::new();
    s.feed(":possel!p@host JOIN #test");

    let err = s.try_feed(":bob!b@h PART #test").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Channel(ChannelError::UserNotFound { .. })
    ));
}

#[test]
fn part_of_unknown_channel_is_rejected() {
    let mut s = TestSession::new();
    let err = s.try_feed(":bob!b@h PART #nowhere").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Channel(ChannelError::UserNotFound { ref channel, .. }) if channel == "#nowhere"
    ));
}

#[test]
fn quit_tolerates_channels_without_the_user() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #a");
    s.feed(":carol!c@h JOIN #b");
    s.feed(":carol!c@h JOIN #c");
    s.events();

    s.feed(":bob!b@h QUIT :gone");

    assert!(s.members("#a").is_empty());
    assert_eq!(s.members("#b"), vec!["carol"]);
    let deleted: Vec<String> = s
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::DeletedMembership { user, channel } => {
                assert_eq!(user.nick, "bob");
                Some(channel)
            }
            _ => None,
        })
        .collect();
    assert_eq!(deleted, vec!["#a"]);
}

#[test]
fn own_part_and_quit_leave_state_alone() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #test :possel bob");
    s.feed(":possel!p@host PART #test");
    s.feed(":possel!p@host QUIT :bye");
    assert_eq!(s.members("#test"), vec!["bob", "possel"]);
}

#[test]
fn quitting_user_is_kept_in_registry() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #a");
    let bob = s.id_of("bob");
    s.feed(":bob!b@h QUIT");
    assert_eq!(s.engine.users().get(bob).unwrap().nick, "bob");
}

// ============================================================================
// NICK
// ============================================================================

#[test]
fn nick_change_is_published_per_channel() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #a");
    s.feed(":bob!b@h JOIN #b");
    s.events();

    s.feed(":bob!b@h NICK robert");
    let mut channels: Vec<String> = s
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::NickChange { channel, .. } => Some(channel),
            _ => None,
        })
        .collect();
    channels.sort();
    assert_eq!(channels, vec!["#a", "#b"]);
}

#[test]
fn own_nick_change_updates_identity() {
    let mut s = TestSession::new();
    s.feed(":possel!p@host NICK possel2");
    assert_eq!(s.engine.nick(), "possel2");
    assert_eq!(s.engine.identity().nick, "possel2");
}

#[test]
fn nick_collision_merges_placeholder() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #x");
    s.feed(":srv 353 possel = #y :@bobby");
    let bob = s.id_of("bob");

    s.feed(":bob!b@h NICK bobby");

    assert_eq!(s.id_of("bobby"), bob);
    assert_eq!(s.members("#x"), vec!["bobby"]);
    assert_eq!(s.members("#y"), vec!["bobby"]);
    let key = s.engine.channels().key("#y");
    assert!(s.engine.users().get(bob).unwrap().has_mode(&key, 'o'));
}

#[test]
fn welcome_nick_absorbs_placeholder_memberships() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #x :+possel_ bob");
    let own = s.engine.users().own_id();

    s.feed(":irc.example.net 001 possel_ :Welcome");

    assert_eq!(s.id_of("possel_"), own);
    assert_eq!(s.members("#x"), vec!["bob", "possel_"]);
    let chan = s.engine.channels().get("#x").unwrap();
    assert!(chan.is_member(own));
    assert_eq!(chan.member_count(), 2);
    let key = s.engine.channels().key("#x");
    assert!(s.engine.users().own().has_mode(&key, 'v'));
}

#[test]
fn nick_onto_own_nick_is_rejected() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #x");
    let err = s.try_feed(":bob!b@h NICK possel").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Registry(RegistryError::NickInUse(_))
    ));
}

// ============================================================================
// MODE
// ============================================================================

#[test]
fn mode_adds_and_removes_status() {
    let mut s = TestSession::new();
    s.feed(":bob!b@h JOIN #x");
    let key = s.engine.channels().key("#x");
    let bob = s.id_of("bob");

    s.feed(":ChanServ!s@services MODE #x +o bob");
    assert!(s.engine.users().get(bob).unwrap().has_mode(&key, 'o'));

    s.feed(":ChanServ!s@services MODE #x -o bob");
    assert!(!s.engine.users().get(bob).unwrap().has_mode(&key, 'o'));

    // Removing again is a no-op.
    s.feed(":ChanServ!s@services MODE #x -o bob");
}

#[test]
fn mode_with_several_changes() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #x :alice bob");
    let key = s.engine.channels().key("#x");

    s.feed(":op!o@h MODE #x +ntov alice bob");
    let users = s.engine.users();
    assert!(users.get(s.id_of("alice")).unwrap().has_mode(&key, 'o'));
    assert!(users.get(s.id_of("bob")).unwrap().has_mode(&key, 'v'));
}

#[test]
fn mode_skips_list_arguments() {
    let mut s = TestSession::new();
    s.feed(":srv 353 possel = #x :alice");
    let before = s.engine.users().len();

    s.feed(":op!o@h MODE #x +bo *!*@spam alice");
    let key = s.engine.channels().key("#x");
    assert!(s.engine.users().get(s.id_of("alice")).unwrap().has_mode(&key, 'o'));
    assert_eq!(s.engine.users().len(), before);
}

#[test]
fn advertised_prefix_defines_status_modes() {
    let mut s = TestSession::new();
    s.feed(":srv 005 possel PREFIX=(Yov)!@+ CHANTYPES=# :are supported by this server");
    s.feed(":srv 353 possel = #x :!alice @bob carol");
    let key = s.engine.channels().key("#x");

    assert_eq!(s.members("#x"), vec!["alice", "bob", "carol"]);
    assert!(s.engine.users().get(s.id_of("alice")).unwrap().has_mode(&key, 'Y'));

    s.feed(":op!o@h MODE #x +Y carol");
    assert!(s.engine.users().get(s.id_of("carol")).unwrap().has_mode(&key, 'Y'));
}

#[test]
fn modes_outside_advertised_prefix_are_not_status() {
    let mut s = TestSession::new();
    s.feed(":srv 005 possel PREFIX=(ov)@+ :are supported by this server");
    s.feed(":srv 353 possel = #x :alice");
    let before = s.engine.users().len();

    // Here `q` is a quiet list, its argument is a mask.
    s.feed(":op!o@h MODE #x +qo *!*@spam alice");
    let key = s.engine.channels().key("#x");
    let alice = s.engine.users().get(s.id_of("alice")).unwrap();
    assert!(alice.has_mode(&key, 'o'));
    assert!(!alice.has_mode(&key, 'q'));
    assert_eq!(s.engine.users().len(), before);
}

#[test]
fn unknown_mode_direction_is_rejected() {
    let mut s = TestSession::new();
    let err = s.try_feed(":op!o@h MODE #x *o bob").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Mode(ModeParseError::UnknownModeCommand { modifier: '*', .. })
    ));
}

#[test]
fn user_mode_changes_are_ignored() {
    let mut s = TestSession::new();
    s.feed(":possel MODE possel :+i");
    assert_eq!(s.engine.users().len(), 1);
}

use teloxide::utils::html;

use crate::platform::Reply;

pub const CANCEL: &str = "/cancel";
pub const SKIP: &str = "/skip";

pub fn setup_started() -> Reply {
    Reply::with_buttons(
        "🔐 <b>Portal Setup Wizard</b>\n\n\
        <b>Step 1/3: Public Channel</b>\n\n\
        Please forward a message from your public channel or send the channel username \
        (e.g., @yourchannel).\n\n\
        ⚠️ Make sure the bot is an admin in the channel!\n\n\
        Send /cancel to cancel setup.",
        &[CANCEL],
    )
}

pub fn channel_usage(problem: &str) -> Reply {
    Reply::with_buttons(
        format!(
            "{}\n\n\
            Please either:\n\
            • Forward a message from your channel\n\
            • Send the channel username (e.g., @yourchannel)",
            problem
        ),
        &[CANCEL],
    )
}

pub fn channel_verified(title: &str) -> Reply {
    Reply::with_buttons(
        format!(
            "✅ Channel verified: <b>{}</b>\n\n\
            <b>Step 2/3: Private Group</b>\n\n\
            Now, forward a message from your private group or send the group username/ID.\n\n\
            ⚠️ Make sure the bot is an admin in the group!",
            html::escape(title)
        ),
        &[CANCEL],
    )
}

pub fn group_usage(problem: &str) -> Reply {
    Reply::with_buttons(
        format!(
            "{}\n\n\
            Please either:\n\
            • Forward a message from your group\n\
            • Send the group username (e.g., @yourgroup)\n\
            • Send the group ID (e.g., -1001234567890)",
            problem
        ),
        &[CANCEL],
    )
}

pub fn group_verified(title: &str) -> Reply {
    Reply::with_buttons(
        format!(
            "✅ Group verified: <b>{}</b>\n\n\
            <b>Step 3/3: Welcome Message</b>\n\n\
            Send a custom welcome message for users (or /skip to use default).\n\n\
            This message will be shown when users click the verify button.",
            html::escape(title)
        ),
        &[SKIP, CANCEL],
    )
}

pub fn welcome_usage() -> Reply {
    Reply::with_buttons(
        "Please send the welcome message as text, or /skip to use the default.",
        &[SKIP, CANCEL],
    )
}

pub fn cancelled() -> Reply {
    Reply::text("❌ Portal setup cancelled.")
}

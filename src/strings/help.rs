//! # Help Text
//!
//! Help message for the bot, displayed via the `.help` command.

pub const MAIN: &str = concat!(
    "**🔨 Auctioneer Help**\n",
    "\n",
    "**📣 Announcing**\n",
    "Post a message like:\n",
    "* `Auction 10: Attack cage` (closed by an admin)\n",
    "* `Auction 7: Shield in 2 hours`\n",
    "* `Auction: Bow at 20:00`\n",
    "\n",
    "React to the announcement to take part. ",
    "When the auction closes, a winner is drawn at random from everyone still reacting.\n",
    "\n",
    "**⚡ Commands**\n",
    "* `.auctions`: List active auctions\n",
    "* `.close [id | lot]`: Close an auction (latest if omitted, admins only)\n",
    "* `.help`: Show this message\n"
);

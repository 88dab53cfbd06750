pub mod scripted_irc;

//! CLI feed command handlers.

use serde::Serialize;

use crate::api::{PlaylistInfo, VideoItem};

use super::{Context, FeedArgs, FeedCommands};

/// Handle `tubelink feed <command>`.
pub async fn handle_feed(ctx: &Context, args: FeedArgs) -> Result<(), Box<dyn std::error::Error>> {
    let youtube = ctx.youtube()?;
    match args.command {
        FeedCommands::Subscriptions => print_videos(&youtube.subscriptions().await?, args.json),
        FeedCommands::Playlists => print_playlists(&youtube.playlists().await?, args.json),
        FeedCommands::Playlist(playlist) => print_videos(
            &youtube.playlist_videos(&playlist.playlist_id).await?,
            args.json,
        ),
        FeedCommands::Recommendations => {
            print_videos(&youtube.recommendations().await?, args.json)
        }
    }
}

fn print_videos(videos: &[VideoItem], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        return print_json(videos);
    }
    if videos.is_empty() {
        println!("No videos found");
    }
    for video in videos {
        println!("{}  {}  [{}]", video.watch_url(), video.title, video.channel_title);
    }
    Ok(())
}

fn print_playlists(
    playlists: &[PlaylistInfo],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        return print_json(playlists);
    }
    if playlists.is_empty() {
        println!("No playlists found");
    }
    for playlist in playlists {
        println!(
            "{}  {}  ({} videos)",
            playlist.playlist_id, playlist.title, playlist.item_count
        );
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::time::Duration;

use anyhow::{Result, bail};
use zhipu_ox::{ModelCategory, TaskStatus, VideoGenerationRequest, Zhipu};

use super::Steps;

const POLL_INTERVAL: Duration = Duration::from_secs(10);
const MAX_POLLS: u32 = 30;

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    println!("\n⚠️  Video generation usually takes 1-5 minutes");
    steps.step("Text to video", text_to_video(client)).await;
    steps.note(
        "Image to video",
        "Set `image_url` on VideoGenerationRequest to animate a first frame, e.g.
prompt \"让画面动起来，微风吹动树叶\" with size 1920x1080 and duration 5.
The free cogvideox-flash model may not accept it; cogvideox-3 does.",
    );
}

async fn text_to_video(client: &Zhipu) -> Result<()> {
    let request = VideoGenerationRequest::builder()
        .model(ModelCategory::Video.default_model())
        .prompt("一只大熊猫在竹林中悠闲地吃竹子，阳光透过树叶洒落，自然光线")
        .size("1920x1080")
        .fps(30)
        .duration(5)
        .build();

    println!("\n📤 Model: {}\n   Size: 1920x1080, 30fps, 5s", request.model);
    let task = client.generate_video(&request).await?;
    println!("\n📥 Task {} accepted ({:?})", task.id, task.task_status);

    println!("⏳ Polling every {}s, at most {MAX_POLLS} times...", POLL_INTERVAL.as_secs());
    let result = client.wait_for_video(&task.id, POLL_INTERVAL, MAX_POLLS).await?;

    match result.task_status {
        TaskStatus::Success => {
            println!("\n🎬 Video: {}", result.video_url().unwrap_or("(no url)"));
            if let Some(cover) = result.video_result.first().and_then(|v| v.cover_image_url.as_deref()) {
                println!("🖼️  Cover: {cover}");
            }
            Ok(())
        }
        TaskStatus::Processing => {
            println!("\n⏳ Still processing; query task {} again later", task.id);
            Ok(())
        }
        status => bail!("video task {} ended with status {status:?}", task.id),
    }
}

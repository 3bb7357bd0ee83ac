use anyhow::Result;
use zhipu_ox::{ImageGenerationRequest, ModelCategory, Zhipu, generation::ImageResponseFormat};

use super::Steps;

const STYLE_PROMPTS: [(&str, &str); 5] = [
    ("photo", "a professional photograph of a golden retriever, high quality, detailed fur, natural lighting"),
    ("anime", "anime girl with long blue hair, cherry blossom background, studio ghibli style"),
    ("oil painting", "oil painting of a sunset over mountains, impressionist style, warm colors, van gogh style"),
    ("pixel art", "pixel art of a cute robot, 8-bit style, retro gaming aesthetic"),
    ("watercolor", "watercolor painting of flowers, soft colors, artistic, delicate brushstrokes"),
];

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    println!("\n⚠️  Image generation uses more quota than chat");
    steps.step("Text to image", single(client)).await;
    steps.step("Two images at once", batch(client)).await;
    steps.step("Aspect ratios", sizes(client)).await;

    let styles = STYLE_PROMPTS
        .iter()
        .map(|(style, prompt)| format!("  [{style}] {prompt}"))
        .collect::<Vec<_>>()
        .join("\n");
    steps.note("Style prompts", &styles);
}

fn request(prompt: &str, n: u32, size: &str) -> ImageGenerationRequest {
    ImageGenerationRequest::builder()
        .model(ModelCategory::Image.default_model())
        .prompt(prompt)
        .n(n)
        .size(size)
        .response_format(ImageResponseFormat::Url)
        .build()
}

async fn single(client: &Zhipu) -> Result<()> {
    let request = request("一只可爱的猫咪坐在窗台上，阳光洒在它身上，宫崎骏动画风格", 1, "1024x1024");
    println!("\n📤 Model: {}\n   Prompt: {}", request.model, request.prompt);

    let response = client.generate_images(&request).await?;
    for url in response.urls() {
        println!("\n🖼️  {url}");
    }
    Ok(())
}

async fn batch(client: &Zhipu) -> Result<()> {
    let response = client
        .generate_images(&request("未来科技城市，霓虹灯，赛博朋克风格", 2, "1024x1024"))
        .await?;

    println!("\n✅ {} image(s):", response.data.len());
    for (i, url) in response.urls().enumerate() {
        println!("   {}. {url}", i + 1);
    }
    Ok(())
}

async fn sizes(client: &Zhipu) -> Result<()> {
    for size in ["768x1344", "1024x1024", "1344x768"] {
        println!("\n📤 {size}...");
        let response = client
            .generate_images(&request("山水画，中国传统水墨画风格", 1, size))
            .await?;
        match response.urls().next() {
            Some(url) => println!("  ✅ {size}: {url}"),
            None => println!("  ⚠️  {size}: no image returned"),
        }
    }
    Ok(())
}

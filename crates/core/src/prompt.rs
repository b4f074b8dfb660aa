use crate::types::VideoReference;

/// Number of segments requested from the model.
pub const REQUESTED_CLIPS: usize = 3;

pub static ANALYSIS_SYSTEM_PROMPT: &str = r#"
Sen viral video uzmanısın. Sana bir YouTube video bağlantısı verilecek.
Görevin, Google Search aracını kullanarak bu videoyu, yorumlarını ve içeriğini analiz etmek
ve viral olma potansiyeli en yüksek anları belirlemektir.

ADIMLAR:
1. Videonun konusunu ve genel akışını anla.
2. Yorumlarda sıkça bahsedilen zaman damgalarını (timestamps) ara.
3. İzleyicilerin "en komik an", "efsane kısım", "korktum" gibi tepkiler verdiği anları belirle.
4. Her kesit için tıklanmayı artıracak bir "Viral Başlık" ve kısa bir açıklama yaz.
5. Google Search ile videonun en çok etkileşim alan kısımlarını doğrula.

ÇIKTI: Yanıtını SADECE tek bir JSON objesi olarak ver. Markdown veya kod bloğu kullanma,
JSON dışında hiçbir metin ekleme.

{
  "clips": [
    {
      "start": 120,
      "end": 135,
      "title": "Örnek Başlık",
      "description": "Örnek açıklama..."
    }
  ],
  "peakMoment": "En yüksek etkileşim anının detaylı analizi..."
}

KURALLAR:
- "start" ve "end" videonun başından itibaren saniye cinsinden sayılardır, "end" > "start".
- "peakMoment" isteğe bağlıdır.
"#;

pub fn build_user_prompt(video: &VideoReference) -> String {
    format!(
        "Analiz Edilecek YouTube Videosu: {url}\n\
         Video Kimliği: {id}\n\n\
         Lütfen bu videoyu araştır. Yorumları, açıklamayı ve videonun popüler kısımlarını bul.\n\
         Bana viral olma potansiyeli en yüksek {count} kesiti (start/end saniyeleriyle) JSON formatında ver.",
        url = video.url,
        id = video.id,
        count = REQUESTED_CLIPS,
    )
}

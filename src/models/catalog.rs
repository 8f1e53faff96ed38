use rust_decimal_macros::dec;

use super::{CandleSize, Category, Product};

/// Products offered by the shop, in display order
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product {
            id: "1".to_string(),
            name: "Luminous Gold Dust".to_string(),
            price: dec!(95.0),
            description: "Onde o aroma encontra o requinte. Velas artesanais com acabamento \
                sofisticado e folhas de ouro, criadas para transformar ambientes em experiências."
                .to_string(),
            category: Category::Amadeirado,
            images: vec![
                "https://i.ibb.co/v6c2FWmr/64b0be51-7f15-41ed-bdeb-9a02d9da7c90.jpg".to_string(),
            ],
            aroma: "Sândalo, Âmbar e Madeira de Cedro".to_string(),
            size: CandleSize::Media,
            weight: "210g".to_string(),
            burn_time: "38 horas".to_string(),
            is_best_seller: Some(true),
            is_new: None,
            reviews: vec![],
        },
        Product {
            id: "2".to_string(),
            name: "Amor em Cores".to_string(),
            price: dec!(85.0),
            description: "Uma explosão de doçura e carinho. Esta vela apresenta corações de cera \
                coloridos esculpidos à mão, flutuando em uma base de baunilha cremosa."
                .to_string(),
            category: Category::Doce,
            images: vec![
                "https://i.ibb.co/b5NtTgsY/8c79dbf3-10e8-4834-861d-3de4c301570f.jpg".to_string(),
            ],
            aroma: "Marshmallow, Baunilha e Framboesa".to_string(),
            size: CandleSize::Media,
            weight: "190g".to_string(),
            burn_time: "32 horas".to_string(),
            is_best_seller: None,
            is_new: Some(true),
            reviews: vec![],
        },
        Product {
            id: "3".to_string(),
            name: "Champagne Toast".to_string(),
            price: dec!(98.0),
            description: "Elegância em forma de chama. Com uma rosa de cera esculpida no topo, \
                esta vela celebra momentos especiais com um aroma efervescente e luxuoso."
                .to_string(),
            category: Category::Fresco,
            images: vec![
                "https://i.ibb.co/n8tCJDnL/69da8235-779c-4037-be88-94eda152a1dd.jpg".to_string(),
            ],
            aroma: "Champagne, Nectarina e Groselha Branca".to_string(),
            size: CandleSize::Media,
            weight: "200g".to_string(),
            burn_time: "35 horas".to_string(),
            is_best_seller: Some(true),
            is_new: None,
            reviews: vec![],
        },
        Product {
            id: "4".to_string(),
            name: "Cereja e Avelã".to_string(),
            price: dec!(89.0),
            description: "Doce no aroma, linda no visual. Nossa vela Cereja & Avelã é perfeita \
                para presentear ou se presentear. Estoque limitado"
                .to_string(),
            category: Category::Doce,
            images: vec![
                "https://i.ibb.co/mF5gPHSN/f11cd666-a7f2-4d8d-8bcd-872ca94a71a5.jpg".to_string(),
            ],
            aroma: "Cereja Negra, Avelã Tostada e Caramelo".to_string(),
            size: CandleSize::Media,
            weight: "200g".to_string(),
            burn_time: "35 horas".to_string(),
            is_best_seller: None,
            is_new: None,
            reviews: vec![],
        },
        Product {
            id: "5".to_string(),
            name: "Velas Botanic Premium".to_string(),
            price: dec!(100.0),
            description: "A joia da nossa coleção. Uma vela de grande porte apresentada em uma \
                redoma de vidro clássica, exalando um frescor floral que transforma ambientes."
                .to_string(),
            category: Category::Floral,
            images: vec![
                "https://i.ibb.co/bgZYJ4LG/01649fab-f079-402e-bdab-df06cd2791bb.jpg".to_string(),
            ],
            aroma: "Orquídea Branca, Lírio do Vale e Musgo".to_string(),
            size: CandleSize::Grande,
            weight: "400g".to_string(),
            burn_time: "65 horas".to_string(),
            is_best_seller: Some(true),
            is_new: None,
            reviews: vec![],
        },
        Product {
            id: "6".to_string(),
            name: "Rosa Esculpida".to_string(),
            price: dec!(92.0),
            description: "Uma escultura em cera no formato de rosa. Tão bela que você hesitará \
                em acendê-la. Uma peça de perfumaria fina."
                .to_string(),
            category: Category::Floral,
            images: vec![
                "https://i.ibb.co/ZpSCbnmg/fbc2042d-8b8e-44c6-8dd3-c9712e564f8a.jpg".to_string(),
            ],
            aroma: "Rosas de Maio, Peônia e Musk".to_string(),
            size: CandleSize::Pequena,
            weight: "150g".to_string(),
            burn_time: "25 horas".to_string(),
            is_best_seller: None,
            is_new: Some(true),
            reviews: vec![],
        },
        Product {
            id: "7".to_string(),
            name: "Pôr do Sol em Capri".to_string(),
            price: dec!(105.0),
            description: "Elegância que se sente no ar. Nossa vela Botanic em cúpula é a união \
                perfeita entre sofisticação e aconchego, um design atemporal que decora com \
                delicadeza e perfuma o ambiente de forma suave e envolvente."
                .to_string(),
            category: Category::Citrico,
            images: vec![
                "https://i.ibb.co/zHQH5ym4/Captura-de-tela-2026-02-04-124820.png".to_string(),
            ],
            aroma: "Botanic em cúpula".to_string(),
            size: CandleSize::Grande,
            weight: "350g".to_string(),
            burn_time: "55 horas".to_string(),
            is_best_seller: None,
            is_new: Some(true),
            reviews: vec![],
        },
    ]
}
